//! Entry points shared by the web handlers and the command line.

pub mod converter;
pub mod headers;

pub use converter::{ConversionOptions, ConversionResult, Converter, ProfileResponse};
pub use headers::{retrieval_headers, safe_display_name, subscription_headers, HeaderList};
