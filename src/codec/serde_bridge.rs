//! Conversions between user types and [`CalcValue`]s, driven by serde.
//!
//! Structs travel through `rmp_serde` with map-form struct encoding, so a
//! `#[derive(Serialize, Deserialize)]` struct lines up with a
//! [`TypeDesc::Record`](crate::TypeDesc::Record) of the same field names.

use crate::{
    codec::msgpack::{from_untyped_msgpack, to_untyped_msgpack},
    CalcValue, ProviderResult,
};
use serde::{de::DeserializeOwned, Serialize};

/// Converts any serializable value into a [`CalcValue`].
pub fn to_calc_value<T: Serialize>(value: &T) -> ProviderResult<CalcValue> {
    let bytes = rmp_serde::to_vec_named(value)?;
    let mut rdr = &bytes[..];
    let msgpack_value = rmpv::decode::read_value(&mut rdr)?;
    from_untyped_msgpack(msgpack_value)
        .map_err(|e| crate::ProviderError::UsageDetailed(e.to_string()))
}

/// Converts a [`CalcValue`] into any deserializable type.
pub fn from_calc_value<T: DeserializeOwned>(value: &CalcValue) -> ProviderResult<T> {
    let msgpack_value = to_untyped_msgpack(value);
    let mut bytes = Vec::new();
    rmpv::encode::write_value(&mut bytes, &msgpack_value)?;
    Ok(rmp_serde::from_slice(&bytes)?)
}
