//! fxnorm Common Types
//!
//! This crate contains the types shared across the fxnorm workspace:
//! validated currency codes, the line items and products handed to the
//! conversion engine, and a few time helpers.

pub mod identifiers;
pub mod monetary;
pub mod items;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use items::*;
pub use error::*;
pub use time::*;
