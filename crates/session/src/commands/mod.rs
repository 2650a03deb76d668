//! OpenPGP card command templates

pub mod get_data;
pub use get_data::*;
pub mod read_public_key;
pub use read_public_key::*;
pub mod select;
pub use select::*;
pub mod sign;
pub use sign::*;
pub mod verify;
pub use verify::*;
