//! Routing rule sets and the proxy groups their policies point at.

pub mod builtin;
pub mod catalog;
pub mod groups;

pub use builtin::{BuiltinRuleSet, BUILTIN_RULESETS, DEFAULT_RULESET};
pub use catalog::{ResolvedRules, RuleCatalog};
pub use groups::GroupTemplate;
