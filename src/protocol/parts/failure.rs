use crate::ProviderResult;
use byteorder::{BigEndian, WriteBytesExt};

pub(crate) const MAX_CODE_LEN: usize = 255;
pub(crate) const MAX_MESSAGE_LEN: usize = 65_535;

/// A failure that is reported to the supervisor instead of a result.
///
/// `code` is a short machine-readable kind (e.g. `NotFound`, `ArityMismatch`,
/// or whatever a user computation chooses), `message` a human-readable
/// description. On the wire, code and message are silently truncated to
/// 255 and 65 535 bytes respectively.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalcFailure {
    code: String,
    message: String,
}

impl CalcFailure {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    // code_len:u8 | code | message_len:u16 BE | message
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn to_body(&self) -> ProviderResult<Vec<u8>> {
        let code = truncate_to_char_boundary(&self.code, MAX_CODE_LEN);
        let message = truncate_to_char_boundary(&self.message, MAX_MESSAGE_LEN);
        let mut body = Vec::with_capacity(1 + code.len() + 2 + message.len());
        body.write_u8(code.len() as u8)?;
        body.extend_from_slice(code.as_bytes());
        body.write_u16::<BigEndian>(message.len() as u16)?;
        body.extend_from_slice(message.as_bytes());
        Ok(body)
    }
}

impl std::fmt::Display for CalcFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CalcFailure {}

// Cuts off after at most max_len bytes without splitting a UTF-8 scalar.
pub(crate) fn truncate_to_char_boundary(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_failure_body() {
        let body = CalcFailure::new("E", "boom").to_body().unwrap();
        assert_eq!(body, [1, b'E', 0, 4, b'b', b'o', b'o', b'm']);
    }

    #[test]
    fn test_code_and_message_are_truncated() {
        let long_code = "c".repeat(300);
        let long_message = "m".repeat(70_000);
        let body = CalcFailure::new(long_code, long_message).to_body().unwrap();
        assert_eq!(body[0] as usize, MAX_CODE_LEN);
        let message_len =
            u16::from_be_bytes([body[1 + MAX_CODE_LEN], body[2 + MAX_CODE_LEN]]) as usize;
        assert_eq!(message_len, MAX_MESSAGE_LEN);
        assert_eq!(body.len(), 1 + MAX_CODE_LEN + 2 + MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'ä' is two bytes; an odd limit would split it
        let s = "ä".repeat(200);
        let truncated = truncate_to_char_boundary(&s, MAX_CODE_LEN);
        assert_eq!(truncated.len(), MAX_CODE_LEN - 1);
        assert!(truncated.chars().all(|c| c == 'ä'));
    }
}
