//! Turns proxy share links and subscriptions into Clash profiles that are
//! stored under a token and served back to clients.

pub mod error;
pub mod generator;
pub mod interfaces;
pub mod models;
pub mod parser;
pub mod rulesets;
pub mod settings;
pub mod storage;
pub mod utils;
#[cfg(feature = "web-api")]
pub mod web_handlers;

pub use error::{Error, ErrorClass, Result};
pub use models::{ProxyNode, ProxyProtocol, Transport};
pub use settings::Settings;
