use crate::{protocol::parts::failure, ProviderResult};
use byteorder::{BigEndian, WriteBytesExt};

// Body of a Progress frame: fraction:f32 BE | message_len:u16 BE | message.
// The fraction is transmitted as-is; keeping it within 0..=1 is the
// reporting computation's contract.
#[derive(Debug)]
pub(crate) struct Progress<'a> {
    fraction: f32,
    message: &'a str,
}

impl<'a> Progress<'a> {
    pub fn new(fraction: f32, message: &'a str) -> Self {
        Self { fraction, message }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn to_body(&self) -> ProviderResult<Vec<u8>> {
        let message =
            failure::truncate_to_char_boundary(self.message, failure::MAX_MESSAGE_LEN);
        let mut body = Vec::with_capacity(4 + 2 + message.len());
        body.write_f32::<BigEndian>(self.fraction)?;
        body.write_u16::<BigEndian>(message.len() as u16)?;
        body.extend_from_slice(message.as_bytes());
        Ok(body)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_progress_body() {
        let body = Progress::new(0.25, "q").to_body().unwrap();
        assert_eq!(body, [0x3E, 0x80, 0x00, 0x00, 0, 1, b'q']);
    }

    #[test]
    fn test_fraction_is_not_clamped() {
        let body = Progress::new(2.5, "").to_body().unwrap();
        assert_eq!(body[..4], 2.5_f32.to_be_bytes());
    }
}
