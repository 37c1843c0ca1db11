use super::groups::GroupTemplate;

/// A rule set compiled into the binary.
#[derive(Debug)]
pub struct BuiltinRuleSet {
    pub name: &'static str,
    pub description: &'static str,
    pub rules: &'static [&'static str],
    pub template: GroupTemplate,
}

impl BuiltinRuleSet {
    pub fn rules(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.to_string()).collect()
    }

    /// Rules as stored in the rules table: one per line.
    pub fn content(&self) -> String {
        self.rules.join("\n")
    }
}

/// Rule set used when a requested name resolves to nothing.
pub const DEFAULT_RULESET: &str = "Default Routing (Chinese Interface)";

const DEFAULT_ZH_RULES: &[&str] = &[
    // Local network
    "DOMAIN-SUFFIX,local,🎯 全球直连",
    "IP-CIDR,127.0.0.0/8,🎯 全球直连,no-resolve",
    "IP-CIDR,192.168.0.0/16,🎯 全球直连,no-resolve",
    "IP-CIDR,10.0.0.0/8,🎯 全球直连,no-resolve",
    "IP-CIDR,172.16.0.0/12,🎯 全球直连,no-resolve",
    // Domestic cloud providers
    "DOMAIN-SUFFIX,aliyun.com,🎯 全球直连",
    "DOMAIN-SUFFIX,tencent.com,🎯 全球直连",
    "DOMAIN-SUFFIX,qcloud.com,🎯 全球直连",
    "DOMAIN-SUFFIX,huaweicloud.com,🎯 全球直连",
    // Telegram
    "DOMAIN-SUFFIX,t.me,📲 资讯平台",
    "DOMAIN-SUFFIX,telegram.org,📲 资讯平台",
    "IP-CIDR,91.108.0.0/16,📲 资讯平台,no-resolve",
    "IP-CIDR,109.239.140.0/24,📲 资讯平台,no-resolve",
    "IP-CIDR,149.154.160.0/20,📲 资讯平台,no-resolve",
    // Streaming
    "DOMAIN-SUFFIX,youtube.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,googlevideo.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,ytimg.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,netflix.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,nflxvideo.net,🌍 全球媒体",
    "DOMAIN-SUFFIX,twitch.tv,🌍 全球媒体",
    "DOMAIN-SUFFIX,hbo.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,hbomax.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,disney.com,🌍 全球媒体",
    "DOMAIN-SUFFIX,disneyplus.com,🌍 全球媒体",
    // Gaming
    "DOMAIN-SUFFIX,steam.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,steamcommunity.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,steampowered.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,epicgames.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,origin.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,ea.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,blizzard.com,🎮 游戏平台",
    "DOMAIN-SUFFIX,battle.net,🎮 游戏平台",
    // International services
    "DOMAIN-SUFFIX,google.com,🚀 节点选择",
    "DOMAIN-SUFFIX,github.com,🚀 节点选择",
    "DOMAIN-SUFFIX,twitter.com,🚀 节点选择",
    "DOMAIN-SUFFIX,facebook.com,🚀 节点选择",
    "DOMAIN-SUFFIX,instagram.com,🚀 节点选择",
    // Domestic sites
    "DOMAIN-SUFFIX,cn,🎯 全球直连",
    "DOMAIN-SUFFIX,baidu.com,🎯 全球直连",
    "DOMAIN-SUFFIX,qq.com,🎯 全球直连",
    "DOMAIN-SUFFIX,taobao.com,🎯 全球直连",
    "DOMAIN-SUFFIX,jd.com,🎯 全球直连",
    "DOMAIN-SUFFIX,bilibili.com,🎯 全球直连",
    "DOMAIN-SUFFIX,weibo.com,🎯 全球直连",
    "DOMAIN-SUFFIX,zhihu.com,🎯 全球直连",
    "DOMAIN-SUFFIX,douban.com,🎯 全球直连",
    "DOMAIN-SUFFIX,sina.com.cn,🎯 全球直连",
    // Ads
    "DOMAIN-KEYWORD,admarvel,🛑 全球拦截",
    "DOMAIN-KEYWORD,admaster,🛑 全球拦截",
    "DOMAIN-KEYWORD,adsage,🛑 全球拦截",
    "DOMAIN-KEYWORD,adsensor,🛑 全球拦截",
    "DOMAIN-KEYWORD,adservice,🛑 全球拦截",
    "DOMAIN-KEYWORD,adwords,🛑 全球拦截",
    "DOMAIN-KEYWORD,analytics,🛑 全球拦截",
    "DOMAIN-KEYWORD,clickserve,🛑 全球拦截",
    "GEOIP,CN,🎯 全球直连",
    "MATCH,🐟 漏网之鱼",
];

const DEFAULT_RULES: &[&str] = &[
    "DOMAIN-SUFFIX,local,DIRECT",
    "IP-CIDR,127.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,192.168.0.0/16,DIRECT,no-resolve",
    "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,172.16.0.0/12,DIRECT,no-resolve",
    // Streaming
    "DOMAIN-SUFFIX,youtube.com,🌍 Streaming",
    "DOMAIN-SUFFIX,googlevideo.com,🌍 Streaming",
    "DOMAIN-SUFFIX,netflix.com,🌍 Streaming",
    "DOMAIN-SUFFIX,nflxvideo.net,🌍 Streaming",
    "DOMAIN-SUFFIX,hulu.com,🌍 Streaming",
    "DOMAIN-SUFFIX,amazon.com,🌍 Streaming",
    "DOMAIN-SUFFIX,primevideo.com,🌍 Streaming",
    "DOMAIN-SUFFIX,disneyplus.com,🌍 Streaming",
    // Social
    "DOMAIN-SUFFIX,facebook.com,📱 Social",
    "DOMAIN-SUFFIX,instagram.com,📱 Social",
    "DOMAIN-SUFFIX,twitter.com,📱 Social",
    "DOMAIN-SUFFIX,tiktok.com,📱 Social",
    "DOMAIN-SUFFIX,snapchat.com,📱 Social",
    "DOMAIN-SUFFIX,linkedin.com,📱 Social",
    // Gaming
    "DOMAIN-SUFFIX,steam.com,🎮 Gaming",
    "DOMAIN-SUFFIX,epicgames.com,🎮 Gaming",
    "DOMAIN-SUFFIX,blizzard.com,🎮 Gaming",
    "DOMAIN-SUFFIX,ea.com,🎮 Gaming",
    "DOMAIN-SUFFIX,ubisoft.com,🎮 Gaming",
    // News
    "DOMAIN-SUFFIX,bbc.com,📰 News",
    "DOMAIN-SUFFIX,cnn.com,📰 News",
    "DOMAIN-SUFFIX,nytimes.com,📰 News",
    "DOMAIN-SUFFIX,reuters.com,📰 News",
    "DOMAIN-SUFFIX,wsj.com,📰 News",
    // Ads and tracking
    "DOMAIN-KEYWORD,advertisement,🛑 Ad Block",
    "DOMAIN-KEYWORD,analytics,🛑 Ad Block",
    "DOMAIN-KEYWORD,tracking,🛑 Ad Block",
    "MATCH,🚀 Proxy",
];

const RESEARCH_RULES: &[&str] = &[
    "DOMAIN-SUFFIX,local,DIRECT",
    "IP-CIDR,127.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,192.168.0.0/16,DIRECT,no-resolve",
    "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,172.16.0.0/12,DIRECT,no-resolve",
    // AI and ML
    "DOMAIN-SUFFIX,openai.com,🤖 AI Research",
    "DOMAIN-SUFFIX,anthropic.com,🤖 AI Research",
    "DOMAIN-SUFFIX,claude.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,gemini.google.com,🤖 AI Research",
    "DOMAIN-SUFFIX,ai.google.dev,🤖 AI Research",
    "DOMAIN-SUFFIX,bard.google.com,🤖 AI Research",
    "DOMAIN-SUFFIX,perplexity.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,mistral.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,huggingface.co,🤖 AI Research",
    "DOMAIN-SUFFIX,stability.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,midjourney.com,🤖 AI Research",
    "DOMAIN-SUFFIX,runwayml.com,🤖 AI Research",
    "DOMAIN-SUFFIX,replicate.com,🤖 AI Research",
    "DOMAIN-SUFFIX,together.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,pytorch.org,🤖 AI Research",
    "DOMAIN-SUFFIX,tensorflow.org,🤖 AI Research",
    "DOMAIN-SUFFIX,keras.io,🤖 AI Research",
    "DOMAIN-SUFFIX,paperswithcode.com,🤖 AI Research",
    "DOMAIN-SUFFIX,arxiv.org,🤖 AI Research",
    "DOMAIN-SUFFIX,deepmind.com,🤖 AI Research",
    "DOMAIN-SUFFIX,cohere.ai,🤖 AI Research",
    "DOMAIN-SUFFIX,scale.com,🤖 AI Research",
    // Code hosting and package registries
    "DOMAIN-SUFFIX,github.com,💻 Development",
    "DOMAIN-SUFFIX,gitlab.com,💻 Development",
    "DOMAIN-SUFFIX,bitbucket.org,💻 Development",
    "DOMAIN-SUFFIX,stackoverflow.com,💻 Development",
    "DOMAIN-SUFFIX,stackexchange.com,💻 Development",
    "DOMAIN-SUFFIX,npmjs.com,💻 Development",
    "DOMAIN-SUFFIX,pypi.org,💻 Development",
    "DOMAIN-SUFFIX,packagist.org,💻 Development",
    "DOMAIN-SUFFIX,crates.io,💻 Development",
    // Google research tools
    "DOMAIN-SUFFIX,scholar.google.com,📚 Academic",
    "DOMAIN-SUFFIX,google.com,📚 Academic",
    "DOMAIN-SUFFIX,googleapis.com,📚 Academic",
    "DOMAIN-SUFFIX,googleusercontent.com,📚 Academic",
    "DOMAIN-SUFFIX,drive.google.com,📚 Academic",
    "DOMAIN-SUFFIX,docs.google.com,📚 Academic",
    "DOMAIN-SUFFIX,colab.research.google.com,📚 Academic",
    // Publishers
    "DOMAIN-SUFFIX,ieee.org,📚 Academic",
    "DOMAIN-SUFFIX,acm.org,📚 Academic",
    "DOMAIN-SUFFIX,springer.com,📚 Academic",
    "DOMAIN-SUFFIX,nature.com,📚 Academic",
    "DOMAIN-SUFFIX,science.org,📚 Academic",
    "DOMAIN-SUFFIX,elsevier.com,📚 Academic",
    "DOMAIN-SUFFIX,wiley.com,📚 Academic",
    "DOMAIN-SUFFIX,pubmed.ncbi.nlm.nih.gov,📚 Academic",
    "DOMAIN-SUFFIX,researchgate.net,📚 Academic",
    "DOMAIN-SUFFIX,academia.edu,📚 Academic",
    // Cloud
    "DOMAIN-SUFFIX,amazonaws.com,☁️ Cloud",
    "DOMAIN-SUFFIX,azure.com,☁️ Cloud",
    "DOMAIN-SUFFIX,microsoftonline.com,☁️ Cloud",
    "DOMAIN-SUFFIX,googlecloud.com,☁️ Cloud",
    "DOMAIN-SUFFIX,digitalocean.com,☁️ Cloud",
    "DOMAIN-SUFFIX,heroku.com,☁️ Cloud",
    "DOMAIN-SUFFIX,netlify.com,☁️ Cloud",
    "DOMAIN-SUFFIX,vercel.com,☁️ Cloud",
    // Reference
    "DOMAIN-SUFFIX,wikipedia.org,📖 Knowledge",
    "DOMAIN-SUFFIX,wikimedia.org,📖 Knowledge",
    "DOMAIN-SUFFIX,mozilla.org,📖 Knowledge",
    "DOMAIN-SUFFIX,w3.org,📖 Knowledge",
    "DOMAIN-SUFFIX,mdn.mozilla.org,📖 Knowledge",
    "DOMAIN-KEYWORD,analytics,🛑 Ad Block",
    "DOMAIN-KEYWORD,tracking,🛑 Ad Block",
    "MATCH,🚀 Proxy",
];

const MINIMAL_RULES: &[&str] = &[
    "DOMAIN-SUFFIX,local,DIRECT",
    "IP-CIDR,127.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,192.168.0.0/16,DIRECT,no-resolve",
    "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve",
    "IP-CIDR,172.16.0.0/12,DIRECT,no-resolve",
    "GEOIP,CN,DIRECT",
    "MATCH,🚀 Proxy",
];

/// Built-in rule sets in display order.
pub static BUILTIN_RULESETS: [BuiltinRuleSet; 4] = [
    BuiltinRuleSet {
        name: DEFAULT_RULESET,
        description: "Template of balanced routing rules with Chinese interface",
        rules: DEFAULT_ZH_RULES,
        template: GroupTemplate::Localized,
    },
    BuiltinRuleSet {
        name: "Default Routing",
        description: "Template of default balanced routing rules",
        rules: DEFAULT_RULES,
        template: GroupTemplate::Standard,
    },
    BuiltinRuleSet {
        name: "Academic & Research Routing",
        description: "Academic and research resource optimized routing rules",
        rules: RESEARCH_RULES,
        template: GroupTemplate::Research,
    },
    BuiltinRuleSet {
        name: "Minimal Rules",
        description: "Basic routing rules with minimal configuration",
        rules: MINIMAL_RULES,
        template: GroupTemplate::Minimal,
    },
];

pub fn find_builtin(name: &str) -> Option<&'static BuiltinRuleSet> {
    BUILTIN_RULESETS.iter().find(|set| set.name == name)
}

pub fn default_builtin() -> &'static BuiltinRuleSet {
    &BUILTIN_RULESETS[0]
}

pub fn is_builtin_name(name: &str) -> bool {
    find_builtin(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ruleset::catch_all_policy;

    #[test]
    fn test_builtins_end_with_catch_all_into_their_groups() {
        for set in BUILTIN_RULESETS.iter() {
            let last = set.rules.last().unwrap();
            let policy = catch_all_policy(last).unwrap();
            assert!(set.template.has_group(policy), "{}: {}", set.name, policy);
        }
    }

    #[test]
    fn test_builtin_policies_resolve() {
        for set in BUILTIN_RULESETS.iter() {
            for rule in set.rules {
                let policy = rule.split(',').nth(if rule.starts_with("MATCH") { 1 } else { 2 });
                let policy = policy.unwrap();
                assert!(
                    policy == "DIRECT" || policy == "REJECT" || set.template.has_group(policy),
                    "{} uses unknown policy in {}",
                    set.name,
                    rule
                );
            }
        }
    }

    #[test]
    fn test_default_builtin() {
        assert_eq!(default_builtin().name, DEFAULT_RULESET);
        assert!(is_builtin_name("Minimal Rules"));
        assert!(!is_builtin_name("minimal rules"));
    }
}
