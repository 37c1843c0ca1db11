use serde::Serialize;

/// A routing rule set as stored in the rules table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Newline separated `TYPE,PATTERN,POLICY[,FLAG]` lines.
    pub content: String,
    pub is_builtin: bool,
    pub created_at: String,
}

impl RuleRecord {
    pub fn rules(&self) -> Vec<String> {
        split_rule_lines(&self.content)
    }
}

/// Short listing entry, without the rule body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub rule_count: usize,
    pub is_builtin: bool,
}

impl From<&RuleRecord> for RuleSummary {
    fn from(record: &RuleRecord) -> Self {
        RuleSummary {
            id: record.id,
            name: record.name.clone(),
            description: record.description.clone(),
            rule_count: record.rules().len(),
            is_builtin: record.is_builtin,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleListing {
    pub builtin: Vec<RuleSummary>,
    pub custom: Vec<RuleSummary>,
}

/// Splits stored rule text into lines, dropping blanks and `#` comments.
pub fn split_rule_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Returns the policy of a catch-all rule (`MATCH,<policy>` or `FINAL,<policy>`).
pub fn catch_all_policy(rule: &str) -> Option<&str> {
    let mut parts = rule.splitn(3, ',');
    let kind = parts.next()?.trim();
    if !kind.eq_ignore_ascii_case("MATCH") && !kind.eq_ignore_ascii_case("FINAL") {
        return None;
    }
    parts.next().map(str::trim).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rule_lines() {
        let lines = split_rule_lines("# header\nDOMAIN,a.com,DIRECT\n\n  MATCH,Proxy  \n");
        assert_eq!(lines, vec!["DOMAIN,a.com,DIRECT", "MATCH,Proxy"]);
    }

    #[test]
    fn test_catch_all_policy() {
        assert_eq!(catch_all_policy("MATCH,🚀 Proxy"), Some("🚀 Proxy"));
        assert_eq!(catch_all_policy("FINAL,DIRECT"), Some("DIRECT"));
        assert_eq!(catch_all_policy("GEOIP,CN,DIRECT"), None);
        assert_eq!(catch_all_policy("MATCH,"), None);
    }
}
