//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the application,
//! separated from the logic that operates on them.
//!
//! ```rust
//! use subprofile::models::{ProxyNode, ProxyProtocol, Transport};
//!
//! let mut node = ProxyNode::new(
//!     "hk-01".to_string(),
//!     "hk.example.com".to_string(),
//!     443,
//!     ProxyProtocol::Trojan { password: "secret".to_string() },
//! );
//! node.tls = true;
//! assert_eq!(node.transport, Transport::Tcp);
//! ```

pub mod app_state;
pub mod proxy;
pub mod proxy_group_config;
pub mod ruleset;
pub mod subscription;

pub use app_state::AppState;
pub use proxy::{ProxyNode, ProxyProtocol, Transport, DEFAULT_PORT};
pub use proxy_group_config::{ProxyGroupConfig, ProxyGroupType};
pub use ruleset::{RuleListing, RuleRecord, RuleSummary};
pub use subscription::{HistoryEntry, SubscriptionMeta, SubscriptionRecord};
