use crate::codec::msgpack::CodecError;
use time::OffsetDateTime;

/// The MessagePack extended type id under which timestamps travel.
pub(crate) const TIMESTAMP_EXT_TYPE: i8 = 1;

/// A millisecond-precision point in time, counted from the UNIX epoch.
///
/// On the wire this is MessagePack extended type 1, carrying the signed
/// millisecond offset big-endian in the smallest of 1, 2, 4 or 8 bytes that
/// holds the value.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn from_epoch_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn epoch_millis(self) -> i64 {
        self.0
    }

    pub(crate) fn to_ext_bytes(self) -> Vec<u8> {
        let millis = self.0;
        if let Ok(v) = i8::try_from(millis) {
            v.to_be_bytes().to_vec()
        } else if let Ok(v) = i16::try_from(millis) {
            v.to_be_bytes().to_vec()
        } else if let Ok(v) = i32::try_from(millis) {
            v.to_be_bytes().to_vec()
        } else {
            millis.to_be_bytes().to_vec()
        }
    }

    pub(crate) fn from_ext_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let millis = match *bytes {
            [a] => i64::from(i8::from_be_bytes([a])),
            [a, b] => i64::from(i16::from_be_bytes([a, b])),
            [a, b, c, d] => i64::from(i32::from_be_bytes([a, b, c, d])),
            [a, b, c, d, e, f, g, h] => i64::from_be_bytes([a, b, c, d, e, f, g, h]),
            _ => {
                return Err(CodecError::timestamp(format!(
                    "timestamp payload must be 1, 2, 4 or 8 bytes, got {}",
                    bytes.len()
                )))
            }
        };
        Ok(Self(millis))
    }
}

impl From<OffsetDateTime> for Timestamp {
    #[allow(clippy::cast_possible_truncation)]
    fn from(datetime: OffsetDateTime) -> Self {
        // the representable range of OffsetDateTime keeps this within i64
        Self((datetime.unix_timestamp_nanos() / 1_000_000) as i64)
    }
}

impl TryFrom<Timestamp> for OffsetDateTime {
    type Error = crate::ProviderError;

    fn try_from(timestamp: Timestamp) -> Result<Self, Self::Error> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(timestamp.0) * 1_000_000).map_err(
            |e| {
                crate::ProviderError::UsageDetailed(format!(
                    "timestamp {} is outside the representable datetime range: {e}",
                    timestamp.0
                ))
            },
        )
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match OffsetDateTime::try_from(*self)
            .ok()
            .and_then(|dt| dt.format(&time::format_description::well_known::Rfc3339).ok())
        {
            Some(formatted) => write!(f, "{formatted}"),
            None => write!(f, "{}ms", self.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_minimal_width_encoding() {
        assert_eq!(Timestamp::from_epoch_millis(0).to_ext_bytes(), [0]);
        assert_eq!(Timestamp::from_epoch_millis(127).to_ext_bytes(), [127]);
        assert_eq!(Timestamp::from_epoch_millis(-1).to_ext_bytes(), [0xFF]);
        assert_eq!(Timestamp::from_epoch_millis(128).to_ext_bytes(), [0, 128]);
        assert_eq!(
            Timestamp::from_epoch_millis(-129).to_ext_bytes(),
            [0xFF, 0x7F]
        );
        assert_eq!(
            Timestamp::from_epoch_millis(40_000).to_ext_bytes(),
            [0, 0, 0x9C, 0x40]
        );
        assert_eq!(
            Timestamp::from_epoch_millis(3_000_000_000).to_ext_bytes().len(),
            8
        );
    }

    #[test]
    fn test_roundtrip_all_widths() {
        for millis in [
            0,
            1,
            -1,
            127,
            -128,
            128,
            -129,
            32_767,
            -32_768,
            32_768,
            -32_769,
            i64::from(i32::MAX),
            i64::from(i32::MIN),
            i64::from(i32::MAX) + 1,
            i64::from(i32::MIN) - 1,
            i64::MAX,
            i64::MIN,
        ] {
            let timestamp = Timestamp::from_epoch_millis(millis);
            let decoded = Timestamp::from_ext_bytes(&timestamp.to_ext_bytes()).unwrap();
            assert_eq!(decoded, timestamp, "millis = {millis}");
        }
    }

    #[test]
    fn test_bad_width_is_rejected() {
        assert!(Timestamp::from_ext_bytes(&[0, 0, 0]).is_err());
        assert!(Timestamp::from_ext_bytes(&[]).is_err());
    }

    #[test]
    fn test_datetime_conversions() {
        let datetime = datetime!(2023-05-17 12:34:56.789 UTC);
        let timestamp = Timestamp::from(datetime);
        assert_eq!(timestamp.epoch_millis(), 1_684_326_896_789);
        assert_eq!(OffsetDateTime::try_from(timestamp).unwrap(), datetime);
    }
}
