use crate::models::{ProxyGroupConfig, ProxyGroupType};

pub const DIRECT: &str = "DIRECT";
pub const REJECT: &str = "REJECT";

/// One entry of a group's member list before node names are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Member {
    Group(&'static str),
    Direct,
    Reject,
    /// Expands to every node name, or to DIRECT when there are none.
    Nodes,
}

#[derive(Debug)]
struct GroupSpec {
    name: &'static str,
    kind: ProxyGroupType,
    members: &'static [Member],
}

const fn select(name: &'static str, members: &'static [Member]) -> GroupSpec {
    GroupSpec {
        name,
        kind: ProxyGroupType::Select,
        members,
    }
}

const fn url_test(name: &'static str) -> GroupSpec {
    GroupSpec {
        name,
        kind: ProxyGroupType::URLTest,
        members: &[Member::Nodes],
    }
}

use Member::{Direct, Group, Nodes, Reject};

const ZH_SELECT: &str = "🚀 节点选择";
const ZH_AUTO: &str = "♻️ 自动选择";

// The direct group deliberately has no edge back to the top selector.
static LOCALIZED: &[GroupSpec] = &[
    select(ZH_SELECT, &[Group(ZH_AUTO), Direct, Nodes]),
    url_test(ZH_AUTO),
    select("🌍 全球媒体", &[Group(ZH_SELECT), Group(ZH_AUTO), Direct]),
    select("📲 资讯平台", &[Group(ZH_SELECT), Group(ZH_AUTO)]),
    select("🎮 游戏平台", &[Group(ZH_SELECT), Direct, Group(ZH_AUTO)]),
    select("🎯 全球直连", &[Direct]),
    select("🛑 全球拦截", &[Reject, Direct]),
    select("🐟 漏网之鱼", &[Group(ZH_SELECT), Direct, Group(ZH_AUTO)]),
];

const EN_PROXY: &str = "🚀 Proxy";
const EN_AUTO: &str = "♻️ Auto Select";

static STANDARD: &[GroupSpec] = &[
    select(EN_PROXY, &[Group(EN_AUTO), Direct, Nodes]),
    url_test(EN_AUTO),
    select("🌍 Streaming", &[Group(EN_PROXY), Group(EN_AUTO), Direct]),
    select("📱 Social", &[Group(EN_PROXY), Group(EN_AUTO)]),
    select("🎮 Gaming", &[Group(EN_PROXY), Direct, Group(EN_AUTO)]),
    select("📰 News", &[Group(EN_PROXY), Group(EN_AUTO), Direct]),
    select("🛑 Ad Block", &[Reject, Direct]),
];

static RESEARCH: &[GroupSpec] = &[
    select(EN_PROXY, &[Group(EN_AUTO), Direct, Nodes]),
    url_test(EN_AUTO),
    select("🤖 AI Research", &[Group(EN_PROXY), Group(EN_AUTO)]),
    select("💻 Development", &[Group(EN_PROXY), Group(EN_AUTO)]),
    select("📚 Academic", &[Group(EN_PROXY), Group(EN_AUTO)]),
    select("☁️ Cloud", &[Group(EN_PROXY), Direct, Group(EN_AUTO)]),
    select("📖 Knowledge", &[Group(EN_PROXY), Direct]),
    select("🛑 Ad Block", &[Reject, Direct]),
];

static MINIMAL: &[GroupSpec] = &[
    select(EN_PROXY, &[Group(EN_AUTO), Direct, Nodes]),
    url_test(EN_AUTO),
];

/// Set of proxy groups a rule set's policies refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupTemplate {
    /// Chinese group names, used by the default rule set
    Localized,
    /// English groups for general routing
    Standard,
    Research,
    Minimal,
}

impl GroupTemplate {
    pub const ALL: [GroupTemplate; 4] = [
        GroupTemplate::Localized,
        GroupTemplate::Standard,
        GroupTemplate::Research,
        GroupTemplate::Minimal,
    ];

    fn specs(&self) -> &'static [GroupSpec] {
        match self {
            GroupTemplate::Localized => LOCALIZED,
            GroupTemplate::Standard => STANDARD,
            GroupTemplate::Research => RESEARCH,
            GroupTemplate::Minimal => MINIMAL,
        }
    }

    /// The select group that lists every node; catch-all rules point here.
    pub fn top_selector(&self) -> &'static str {
        self.specs()[0].name
    }

    pub fn group_names(&self) -> impl Iterator<Item = &'static str> {
        self.specs().iter().map(|spec| spec.name)
    }

    /// Names a node may not take in a profile built from this template.
    pub fn reserved_names(&self) -> Vec<&'static str> {
        [DIRECT, REJECT].into_iter().chain(self.group_names()).collect()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.group_names().any(|group| group == name)
    }

    /// Picks the template a rule list was written against, judged by the
    /// policy of its catch-all rule.
    pub fn for_catch_all(policy: &str) -> Option<GroupTemplate> {
        // Minimal shares its names with the larger English templates
        [
            GroupTemplate::Localized,
            GroupTemplate::Standard,
            GroupTemplate::Research,
        ]
        .into_iter()
        .find(|template| template.has_group(policy))
    }

    /// Instantiates the template for the given node names. Member lists are
    /// never empty and never repeat an entry.
    pub fn build(&self, node_names: &[String]) -> Vec<ProxyGroupConfig> {
        let nodes: Vec<String> = if node_names.is_empty() {
            vec![DIRECT.to_string()]
        } else {
            node_names.to_vec()
        };

        self.specs()
            .iter()
            .map(|spec| {
                let mut proxies: Vec<String> = Vec::new();
                let mut push = |name: &str| {
                    if !proxies.iter().any(|p| p == name) {
                        proxies.push(name.to_string());
                    }
                };
                for member in spec.members {
                    match member {
                        Group(name) => push(*name),
                        Direct => push(DIRECT),
                        Reject => push(REJECT),
                        Nodes => {
                            for node in &nodes {
                                push(node);
                            }
                        }
                    }
                }
                match spec.kind {
                    ProxyGroupType::Select => ProxyGroupConfig::select(spec.name, proxies),
                    ProxyGroupType::URLTest => ProxyGroupConfig::url_test(spec.name, proxies),
                }
            })
            .collect()
    }
}
