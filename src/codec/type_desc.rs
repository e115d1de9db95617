/// Static description of a parameter or return type of a registered
/// calculation.
///
/// The registry hands these to the value codec; the codec never guesses a
/// type from bytes alone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeDesc {
    /// A boolean value.
    Boolean,
    /// A 64-bit signed integer.
    Integer,
    /// A 64-bit floating-point number.
    Float,
    /// A UTF-8 string.
    Text,
    /// An opaque byte string.
    Blob,
    /// A millisecond-precision point in time.
    Timestamp,
    /// A homogeneous sequence.
    Array(Box<TypeDesc>),
    /// A record with a fixed set of named fields, encoded in map form.
    Record(Vec<(String, TypeDesc)>),
}

impl TypeDesc {
    /// Shorthand for an array descriptor.
    pub fn array_of(element: TypeDesc) -> Self {
        Self::Array(Box::new(element))
    }

    /// Shorthand for a record descriptor.
    pub fn record<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, TypeDesc)>,
    {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value_type)| (name.to_string(), value_type))
                .collect(),
        )
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Timestamp => "timestamp",
            Self::Array(_) => "array",
            Self::Record(_) => "record",
        }
    }
}

impl std::fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Array(element) => write!(f, "array of {element}"),
            Self::Record(fields) => {
                write!(f, "record {{")?;
                for (i, (name, value_type)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value_type}")?;
                }
                write!(f, "}}")
            }
            _ => write!(f, "{}", self.name()),
        }
    }
}
