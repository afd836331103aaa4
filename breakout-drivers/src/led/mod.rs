//! LED drivers

pub mod apa102;
pub mod sn3218;

pub use apa102::Apa102;
pub use sn3218::Sn3218;
