use crate::codec::Timestamp;

/// Dynamic representation of an argument or result value.
///
/// The supervisor ships values as MessagePack; the codec materializes them
/// as `CalcValue`s according to the [`TypeDesc`](crate::TypeDesc)s that were
/// registered for the calculation. Records keep their declared field order.
#[derive(Clone, Debug, PartialEq)]
pub enum CalcValue {
    /// A boolean value.
    Boolean(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// An opaque byte string.
    Blob(Vec<u8>),
    /// A millisecond-precision point in time.
    Timestamp(Timestamp),
    /// A homogeneous sequence.
    Array(Vec<CalcValue>),
    /// Named fields, encoded in map form.
    Record(Vec<(String, CalcValue)>),
}

impl CalcValue {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Timestamp(_) => "timestamp",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
        }
    }
}

impl std::fmt::Display for CalcValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(d) => write!(f, "{d}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Blob(b) => write!(f, "<{} bytes>", b.len()),
            Self::Timestamp(ts) => write!(f, "{ts}"),
            Self::Array(items) => write!(f, "<array of {} items>", items.len()),
            Self::Record(fields) => write!(f, "<record with {} fields>", fields.len()),
        }
    }
}

macro_rules! impl_from_for_calc_value {
    ($($from_type:ty => $variant:ident into $target:ty;)*) => {
        $(
            impl From<$from_type> for CalcValue {
                fn from(value: $from_type) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from_for_calc_value! {
    bool => Boolean into bool;
    i8 => Integer into i64;
    i16 => Integer into i64;
    i32 => Integer into i64;
    i64 => Integer into i64;
    u8 => Integer into i64;
    u16 => Integer into i64;
    u32 => Integer into i64;
    f32 => Float into f64;
    f64 => Float into f64;
    &str => Text into String;
    String => Text into String;
    Vec<u8> => Blob into Vec<u8>;
    Timestamp => Timestamp into Timestamp;
}
