//! JS Bridge Types - Host-side value definitions
//!
//! This crate contains the dynamic value representation that the host query
//! engine hands to (and receives from) the embedded JavaScript runtime. It has
//! no dependency on the engine itself.

mod value;

pub use value::*;
