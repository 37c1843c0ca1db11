//! Turning nodes, rules and groups into a Clash profile document.

pub mod exports;
pub mod profile;
pub mod yaml;

pub use profile::ProfileBuilder;
