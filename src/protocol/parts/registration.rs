use crate::{ProviderError, ProviderResult};

// Body of the one Register frame a provider sends after connecting:
// a two-byte protocol sub-identifier followed by the 32-byte
// process-correlation identifier, exactly as provided by the environment.
const PROTOCOL_SUB_ID: [u8; 2] = [0x00, 0x00];
pub(crate) const PID_LEN: usize = 32;
pub(crate) const REGISTRATION_BODY_LEN: usize = PROTOCOL_SUB_ID.len() + PID_LEN;

#[derive(Debug)]
pub(crate) struct Registration<'a> {
    pid: &'a str,
}

impl<'a> Registration<'a> {
    pub fn new(pid: &'a str) -> Self {
        Self { pid }
    }

    pub fn to_body(&self) -> ProviderResult<Vec<u8>> {
        // the pid length is validated when the ConnectParams are built
        if self.pid.len() != PID_LEN {
            return Err(ProviderError::Impl("registration pid must be 32 bytes"));
        }
        let mut body = Vec::with_capacity(REGISTRATION_BODY_LEN);
        body.extend_from_slice(&PROTOCOL_SUB_ID);
        body.extend_from_slice(self.pid.as_bytes());
        Ok(body)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_registration_body() {
        let body = Registration::new("abcdefghijklmnopqrstuvwxyz012345")
            .to_body()
            .unwrap();
        assert_eq!(body.len(), REGISTRATION_BODY_LEN);
        assert_eq!(body[..2], [0, 0]);
        assert_eq!(body[2..], *b"abcdefghijklmnopqrstuvwxyz012345");
    }

    #[test]
    fn test_registration_rejects_wrong_pid_length() {
        assert!(Registration::new("short").to_body().is_err());
    }
}
