use thiserror::Error;

use crate::models::ProxyNode;

/// Why a single link could not be turned into a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Bad base64, bad JSON or an unparsable URI. Carries the decoder's message.
    #[error("malformed {scheme} link: {reason}")]
    MalformedEncoding { scheme: &'static str, reason: String },

    #[error("{scheme} link is missing {field}")]
    MissingField {
        scheme: &'static str,
        field: &'static str,
    },
}

impl ParseFailure {
    pub fn malformed(scheme: &'static str, reason: impl ToString) -> Self {
        ParseFailure::MalformedEncoding {
            scheme,
            reason: reason.to_string(),
        }
    }

    pub fn missing(scheme: &'static str, field: &'static str) -> Self {
        ParseFailure::MissingField { scheme, field }
    }
}

pub type ParseResult = Result<ProxyNode, ParseFailure>;

/// Result of parsing a batch of links: what decoded, and how many did not.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub nodes: Vec<ProxyNode>,
    pub failures: usize,
}
