//! Share link parsing
//!
//! Every supported link format is decoded into a [`crate::models::ProxyNode`].
//! Batch parsing is fault tolerant: bad links are logged and counted, never
//! fatal.

pub mod explodes;
pub mod types;

pub use explodes::{explode, explode_batch, explode_sub};
pub use types::{ParseFailure, ParseOutcome};
