//! Data models for the competition registration backend.
//!
//! Wire shapes use camelCase field names to match the frontend contract.

mod seat;
mod site;
mod team;
mod user;

pub use seat::*;
pub use site::*;
pub use team::*;
pub use user::*;
