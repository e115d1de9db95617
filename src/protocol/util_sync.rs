use crate::{ProviderError, ProviderResult};

// Read n bytes, return as Vec<u8>.
// The peer closing the stream mid-read is a protocol-level truncation,
// not a plain io error.
pub(crate) fn parse_bytes(len: usize, rdr: &mut dyn std::io::Read) -> ProviderResult<Vec<u8>> {
    let mut vec = vec![0_u8; len];
    rdr.read_exact(&mut vec).map_err(map_eof)?;
    Ok(vec)
}

pub(crate) fn map_eof(error: std::io::Error) -> ProviderError {
    if error.kind() == std::io::ErrorKind::UnexpectedEof {
        ProviderError::Truncated
    } else {
        ProviderError::from(error)
    }
}
