/// Probe URL used by url-test groups.
pub const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";
/// Seconds between url-test probes.
pub const DEFAULT_TEST_INTERVAL: u32 = 300;
/// Latency difference in milliseconds tolerated before switching.
pub const DEFAULT_TEST_TOLERANCE: u32 = 50;

/// Type of proxy group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyGroupType {
    Select,
    URLTest,
}

impl ProxyGroupType {
    /// Get string representation of the proxy group type
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyGroupType::Select => "select",
            ProxyGroupType::URLTest => "url-test",
        }
    }
}

/// A named group of proxies, other groups or the DIRECT/REJECT policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyGroupConfig {
    pub name: String,
    pub group_type: ProxyGroupType,
    /// Ordered members; never empty once built by a template.
    pub proxies: Vec<String>,
    /// Probe settings, only meaningful for url-test groups
    pub url: String,
    pub interval: u32,
    pub tolerance: u32,
}

impl ProxyGroupConfig {
    pub fn select(name: &str, proxies: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            group_type: ProxyGroupType::Select,
            proxies,
            url: String::new(),
            interval: 0,
            tolerance: 0,
        }
    }

    pub fn url_test(name: &str, proxies: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            group_type: ProxyGroupType::URLTest,
            proxies,
            url: DEFAULT_TEST_URL.to_string(),
            interval: DEFAULT_TEST_INTERVAL,
            tolerance: DEFAULT_TEST_TOLERANCE,
        }
    }

    pub fn type_str(&self) -> &'static str {
        self.group_type.as_str()
    }
}
