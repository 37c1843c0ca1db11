use std::io::Write;

use subprofile::settings::{init_settings, update_settings_from_content};
use subprofile::Settings;

#[cfg(test)]
mod settings_tests {
    use super::*;

    #[test]
    fn test_full_settings_file() {
        let content = r#"
[server]
listen_address = "127.0.0.1"
listen_port = 8080
base_path = "subs/"
max_concur_threads = 2

[database]
path = "/var/lib/subprofile/data.db"

[converter]
max_proxies = 200
fetch_timeout = 30

[log]
level = "debug"

[default_user]
username = "operator"
password = "secret"

[github]
enabled = false
owner = "someone"
repo = "subprofile"
"#;
        let settings = Settings::load_from_content(content).unwrap();
        assert_eq!(settings.server.listen_address, "127.0.0.1");
        assert_eq!(settings.server.listen_port, 8080);
        assert_eq!(settings.server.base_path, "/subs");
        assert_eq!(settings.server.max_concur_threads, 2);
        assert_eq!(settings.database.path, "/var/lib/subprofile/data.db");
        assert_eq!(settings.converter.max_proxies, 200);
        assert_eq!(settings.converter.fetch_timeout, 30);
        assert!(!settings.converter.user_agent.is_empty());
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.default_user.username, "operator");
        assert_eq!(settings.default_user.password, "secret");
        assert!(!settings.github.enabled);
        assert_eq!(settings.github.repo, "subprofile");
        assert_eq!(settings.github.cache_duration, 3600);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let settings = Settings::load_from_content("[server]\nlisten_port = 9000\n").unwrap();
        assert_eq!(settings.server.listen_port, 9000);
        assert_eq!(settings.server.listen_address, "0.0.0.0");
        assert_eq!(settings.database.path, "subprofile.db");
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(Settings::load_from_content("[server\nlisten_port = 1").is_err());
        assert!(Settings::load_from_content("[server]\nlisten_port = \"high\"").is_err());
    }

    // Global state is shared between tests, so every step touching it lives here.
    #[test]
    fn test_global_settings_lifecycle() {
        update_settings_from_content("[converter]\nmax_proxies = 5\n").unwrap();
        assert_eq!(Settings::current().converter.max_proxies, 5);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nbase_path = \"/api-root/\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        init_settings(&path).unwrap();
        let current = Settings::current();
        assert_eq!(current.server.base_path, "/api-root");
        assert_eq!(current.converter.max_proxies, 1000);
        assert_eq!(current.pref_path, path);

        // An empty path leaves the loaded settings alone
        init_settings("").unwrap();
        assert_eq!(Settings::current().server.base_path, "/api-root");

        assert!(init_settings("/nonexistent/subprofile.toml").is_err());
    }
}
