use crate::{
    protocol::{util_sync, Action},
    ProviderError, ProviderResult,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

pub(crate) const PROTOCOL_VERSION: u8 = 1;
pub(crate) const HEADER_SIZE: usize = 8;

// The fixed 8-byte frame header:
// version:u8 | reserved:u8 | action:u8 | reserved:u8 | length:u32 BE
// Reserved bytes are don't-care on input and written as 0 on output.
#[derive(Debug, Eq, PartialEq)]
pub(crate) struct FrameHeader {
    pub version: u8,
    pub action: Action,
    pub length: u32,
}

impl FrameHeader {
    pub fn new(action: Action, length: u32) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            action,
            length,
        }
    }

    pub fn emit(&self, w: &mut dyn std::io::Write) -> ProviderResult<()> {
        if self.version != PROTOCOL_VERSION {
            return Err(ProviderError::UnsupportedVersion(self.version));
        }
        w.write_u8(self.version)?; // I1
        w.write_u8(0)?; // I1 reserved
        w.write_u8(self.action.to_u8())?; // I1
        w.write_u8(0)?; // I1 reserved
        w.write_u32::<BigEndian>(self.length)?; // UI4 body length
        Ok(())
    }

    pub fn parse(rdr: &mut dyn std::io::Read) -> ProviderResult<Self> {
        let version = rdr.read_u8().map_err(util_sync::map_eof)?;
        if version != PROTOCOL_VERSION {
            return Err(ProviderError::UnsupportedVersion(version));
        }
        let mut header_rest = [0_u8; HEADER_SIZE - 1];
        rdr.read_exact(&mut header_rest).map_err(util_sync::map_eof)?;
        let action = Action::from_u8(header_rest[1])?;
        let length = u32::from_be_bytes([
            header_rest[3],
            header_rest[4],
            header_rest[5],
            header_rest[6],
        ]);
        Ok(Self {
            version,
            action,
            length,
        })
    }
}

// Assembles a complete frame in memory so that it reaches the socket with a
// single write_all. The flush makes the writer hand the bytes to the socket
// before the call returns.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_frame(
    w: &mut dyn std::io::Write,
    action: Action,
    body: &[u8],
) -> ProviderResult<()> {
    if u32::try_from(body.len()).is_err() {
        return Err(ProviderError::Impl("frame body exceeds u32 length"));
    }
    let header = FrameHeader::new(action, body.len() as u32);
    let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
    header.emit(&mut frame)?;
    frame.extend_from_slice(body);
    w.write_all(&frame)?;
    w.flush()?;
    trace!("Frame written: action = {action}, length = {}", body.len());
    Ok(())
}
