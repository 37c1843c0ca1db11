use std::sync::Arc;

use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::builtin::{default_builtin, find_builtin, is_builtin_name, BUILTIN_RULESETS};
use super::groups::GroupTemplate;
use crate::error::{Error, Result};
use crate::models::ruleset::{catch_all_policy, split_rule_lines};
use crate::models::{ProxyGroupConfig, RuleListing, RuleRecord, RuleSummary};
use crate::storage::{rules, Database};

/// `TYPE,VALUE[,...]` with an alphanumeric rule type.
static RULE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*,[^,\s][^,]*(,[^,]*)*$").unwrap());

/// Rules and group template ready to be turned into a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRules {
    pub name: String,
    /// Non-empty, last element is a catch-all.
    pub rules: Vec<String>,
    pub template: GroupTemplate,
}

impl ResolvedRules {
    fn from_builtin(name: &str) -> Option<Self> {
        find_builtin(name).map(|set| ResolvedRules {
            name: set.name.to_string(),
            rules: set.rules(),
            template: set.template,
        })
    }

    fn fallback() -> Self {
        let set = default_builtin();
        ResolvedRules {
            name: set.name.to_string(),
            rules: set.rules(),
            template: set.template,
        }
    }
}

/// Template a stored rule list was written for: its catch-all decides,
/// otherwise the first policy naming a known group.
fn infer_template(rules: &[String]) -> GroupTemplate {
    let from_catch_all = rules
        .last()
        .and_then(|rule| catch_all_policy(rule))
        .and_then(GroupTemplate::for_catch_all);
    from_catch_all
        .or_else(|| {
            rules
                .iter()
                .filter_map(|rule| rule.split(',').nth(2))
                .find_map(|policy| GroupTemplate::for_catch_all(policy.trim()))
        })
        .unwrap_or(GroupTemplate::Localized)
}

fn validate(name: &str, content: &str) -> Result<(String, String)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("rule name must not be empty".to_string()));
    }
    let lines = split_rule_lines(content);
    if lines.is_empty() {
        return Err(Error::Validation("rule content must not be empty".to_string()));
    }
    if let Some(bad) = lines.iter().find(|line| !RULE_LINE.is_match(line)) {
        return Err(Error::Validation(format!("malformed rule line: {}", bad)));
    }
    Ok((name.to_string(), lines.join("\n")))
}

/// Named rule sets: the compiled-in ones plus those users store.
#[derive(Clone)]
pub struct RuleCatalog {
    db: Arc<Database>,
}

impl RuleCatalog {
    pub fn new(db: Arc<Database>) -> Self {
        RuleCatalog { db }
    }

    /// Resolves `name` to rules and a group template. Never fails: anything
    /// unknown, empty or unreadable resolves to the default rule set.
    pub fn resolve(&self, name: &str) -> ResolvedRules {
        if let Some(resolved) = ResolvedRules::from_builtin(name) {
            return resolved;
        }

        let record = match self.db.with_conn(|conn| rules::find_by_name(conn, name)) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Rule set '{}' not found, using default", name);
                return ResolvedRules::fallback();
            }
            Err(err) => {
                error!("Failed to load rule set '{}': {}", name, err);
                return ResolvedRules::fallback();
            }
        };

        let mut rules = record.rules();
        if rules.is_empty() {
            warn!("Rule set '{}' is empty, using default", name);
            return ResolvedRules::fallback();
        }
        let template = infer_template(&rules);
        if rules.last().and_then(|rule| catch_all_policy(rule)).is_none() {
            rules.push(format!("MATCH,{}", template.top_selector()));
        }
        ResolvedRules {
            name: record.name,
            rules,
            template,
        }
    }

    pub fn build_groups(
        &self,
        node_names: &[String],
        template: GroupTemplate,
    ) -> Vec<ProxyGroupConfig> {
        template.build(node_names)
    }

    pub fn create_custom(&self, name: &str, description: &str, content: &str) -> Result<RuleRecord> {
        let (name, content) = validate(name, content)?;
        if is_builtin_name(&name) {
            return Err(Error::DuplicateName(name));
        }
        let record = self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let id = rules::insert(&tx, &name, description.trim(), &content)?;
            let record = rules::find_by_id(&tx, id)?;
            tx.commit()?;
            record.ok_or_else(|| Error::Storage(format!("rule {} vanished after insert", id)))
        })?;
        info!("Created rule set '{}'", record.name);
        Ok(record)
    }

    pub fn update_custom(
        &self,
        id: i64,
        name: &str,
        description: &str,
        content: &str,
    ) -> Result<RuleRecord> {
        let (name, content) = validate(name, content)?;
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let existing = rules::find_by_id(&tx, id)?
                .ok_or_else(|| Error::NotFound(format!("rule {}", id)))?;
            if existing.name != name {
                if existing.is_builtin {
                    return Err(Error::Validation(format!(
                        "built-in rule set '{}' cannot be renamed",
                        existing.name
                    )));
                }
                if is_builtin_name(&name) {
                    return Err(Error::DuplicateName(name.clone()));
                }
            }
            rules::update(&tx, id, &name, description.trim(), &content)?;
            let record = rules::find_by_id(&tx, id)?;
            tx.commit()?;
            record.ok_or_else(|| Error::NotFound(format!("rule {}", id)))
        })
    }

    pub fn delete_custom(&self, id: i64) -> Result<bool> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = rules::delete(&tx, id)?;
            tx.commit()?;
            Ok(removed)
        })
    }

    /// Puts a built-in rule set's stored copy back to the compiled-in text.
    pub fn restore_builtin(&self, id: i64) -> Result<RuleRecord> {
        self.db.with_conn(|conn| {
            let tx = conn.transaction()?;
            let existing = rules::find_by_id(&tx, id)?
                .ok_or_else(|| Error::NotFound(format!("rule {}", id)))?;
            let builtin = find_builtin(&existing.name)
                .ok_or_else(|| Error::NotRestorable(existing.name.clone()))?;
            rules::update(&tx, id, builtin.name, builtin.description, &builtin.content())?;
            let record = rules::find_by_id(&tx, id)?;
            tx.commit()?;
            info!("Restored built-in rule set '{}'", builtin.name);
            record.ok_or_else(|| Error::NotFound(format!("rule {}", id)))
        })
    }

    pub fn list(&self) -> Result<RuleListing> {
        let records = self.db.with_conn(|conn| rules::list_all(conn))?;
        let mut listing = RuleListing::default();
        for set in BUILTIN_RULESETS.iter() {
            if let Some(record) = records.iter().find(|r| r.name == set.name) {
                listing.builtin.push(RuleSummary::from(record));
            }
        }
        listing.custom = records
            .iter()
            .filter(|r| !r.is_builtin)
            .map(RuleSummary::from)
            .collect();
        Ok(listing)
    }

    pub fn get(&self, id: i64) -> Result<RuleRecord> {
        self.db
            .with_conn(|conn| rules::find_by_id(conn, id))?
            .ok_or_else(|| Error::NotFound(format!("rule {}", id)))
    }

    /// Looks a rule set up by name, e.g. to import it as a starting point.
    /// A built-in whose stored copy was deleted is served from the binary
    /// with id 0.
    pub fn get_by_name(&self, name: &str) -> Result<RuleRecord> {
        if let Some(record) = self.db.with_conn(|conn| rules::find_by_name(conn, name))? {
            return Ok(record);
        }
        find_builtin(name)
            .map(|set| RuleRecord {
                id: 0,
                name: set.name.to_string(),
                description: set.description.to_string(),
                content: set.content(),
                is_builtin: true,
                created_at: String::new(),
            })
            .ok_or_else(|| Error::NotFound(format!("rule {}", name)))
    }
}
