mod calc_value;
pub(crate) mod msgpack;
mod serde_bridge;
mod timestamp;
mod type_desc;

pub use calc_value::CalcValue;
pub use serde_bridge::{from_calc_value, to_calc_value};
pub use timestamp::Timestamp;
pub use type_desc::TypeDesc;
