use std::sync::Arc;

use subprofile::rulesets::{RuleCatalog, BUILTIN_RULESETS};
use subprofile::storage::Database;
use subprofile::Error;

fn open(path: &std::path::Path) -> RuleCatalog {
    RuleCatalog::new(Arc::new(Database::open(path).unwrap()))
}

#[cfg(test)]
mod rules_catalog_tests {
    use super::*;

    #[test]
    fn test_custom_rules_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.db");

        let id = {
            let catalog = open(&path);
            let record = catalog
                .create_custom(
                    "Streaming",
                    "video sites",
                    "# video\nDOMAIN-SUFFIX,netflix.com,🌍 Streaming\n\nMATCH,🚀 Proxy",
                )
                .unwrap();
            assert_eq!(
                record.content,
                "DOMAIN-SUFFIX,netflix.com,🌍 Streaming\nMATCH,🚀 Proxy"
            );
            record.id
        };

        let catalog = open(&path);
        let record = catalog.get(id).unwrap();
        assert_eq!(record.name, "Streaming");
        assert_eq!(record.description, "video sites");
        assert!(!record.is_builtin);

        let resolved = catalog.resolve("Streaming");
        assert_eq!(resolved.rules.len(), 2);
        let groups = catalog.build_groups(&["A".to_string()], resolved.template);
        assert_eq!(groups[0].name, "🚀 Proxy");
        assert!(groups.iter().any(|g| g.name == "🌍 Streaming"));
    }

    #[test]
    fn test_reopen_keeps_builtin_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.db");

        {
            let catalog = open(&path);
            let stored = catalog.get_by_name("Default Routing").unwrap();
            catalog
                .update_custom(stored.id, "Default Routing", "mine now", "MATCH,DIRECT")
                .unwrap();
        }

        let catalog = open(&path);
        let listing = catalog.list().unwrap();
        assert_eq!(listing.builtin.len(), BUILTIN_RULESETS.len());
        assert!(listing.custom.is_empty());

        let stored = catalog.get_by_name("Default Routing").unwrap();
        assert_eq!(stored.description, "mine now");
        assert_eq!(stored.content, "MATCH,DIRECT");

        let restored = catalog.restore_builtin(stored.id).unwrap();
        assert_eq!(restored.content, BUILTIN_RULESETS[1].content());
    }

    #[test]
    fn test_deleted_builtin_is_still_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.db");
        let catalog = open(&path);

        let stored = catalog.get_by_name("Minimal Rules").unwrap();
        assert!(catalog.delete_custom(stored.id).unwrap());
        assert!(matches!(catalog.get(stored.id), Err(Error::NotFound(_))));

        let synthesized = catalog.get_by_name("Minimal Rules").unwrap();
        assert_eq!(synthesized.id, 0);
        assert!(synthesized.is_builtin);
        assert_eq!(catalog.resolve("Minimal Rules").name, "Minimal Rules");

        // The stored copy comes back the next time the database is opened
        let reopened = open(&path);
        assert_ne!(reopened.get_by_name("Minimal Rules").unwrap().id, 0);
    }

    #[test]
    fn test_bad_rule_content_is_rejected() {
        let catalog = RuleCatalog::new(Arc::new(Database::open_in_memory().unwrap()));
        for content in ["", "DOMAIN-SUFFIX", ",example.com,DIRECT", "DOMAIN, example.com"] {
            assert!(
                matches!(
                    catalog.create_custom("Broken", "", content),
                    Err(Error::Validation(_))
                ),
                "accepted {:?}",
                content
            );
        }
        assert!(matches!(
            catalog.get_by_name("Broken"),
            Err(Error::NotFound(_))
        ));
    }
}
