use crate::generator::yaml::clash::{
    ClashProxy, ClashProxyGroup, CommonProxyOptions, GrpcOpts, WsHeaders, WsOpts,
};
use crate::models::{ProxyGroupConfig, ProxyGroupType, ProxyNode, ProxyProtocol, Transport};

/// `network`, `ws-opts` and `grpc-opts` values for a transport.
fn transport_options(
    transport: &Transport,
) -> (Option<String>, Option<WsOpts>, Option<GrpcOpts>) {
    match transport {
        Transport::Tcp => (None, None, None),
        Transport::WebSocket { path, host } => (
            Some("ws".to_string()),
            Some(WsOpts {
                path: path.clone(),
                headers: WsHeaders { host: host.clone() },
            }),
            None,
        ),
        Transport::Grpc { service_name } => (
            Some("grpc".to_string()),
            None,
            Some(GrpcOpts {
                grpc_service_name: service_name.clone(),
            }),
        ),
    }
}

fn build_common_proxy_options(node: &ProxyNode) -> CommonProxyOptions {
    let mut common = CommonProxyOptions::new(node.name.clone(), node.server.clone(), node.port);
    if node.udp {
        common.udp = Some(true);
    }
    if node.skip_cert_verify {
        common.skip_cert_verify = Some(true);
    }
    common
}

impl From<&ProxyNode> for ClashProxy {
    fn from(node: &ProxyNode) -> Self {
        let mut common = build_common_proxy_options(node);
        let (network, ws_opts, grpc_opts) = transport_options(&node.transport);

        match &node.protocol {
            ProxyProtocol::Vless { uuid, flow } => {
                if node.tls {
                    common.tls = Some(true);
                }
                // flow only applies to plain tcp over tls
                let flow = if node.tls && node.transport.is_tcp() {
                    flow.clone()
                } else {
                    None
                };
                ClashProxy::Vless {
                    common,
                    uuid: uuid.clone(),
                    flow,
                    network,
                    ws_opts,
                    grpc_opts,
                    servername: node.sni.clone().filter(|_| node.tls),
                }
            }
            ProxyProtocol::Vmess {
                uuid,
                alter_id,
                cipher,
            } => {
                if node.tls {
                    common.tls = Some(true);
                }
                ClashProxy::VMess {
                    common,
                    uuid: uuid.clone(),
                    alter_id: *alter_id,
                    cipher: cipher.clone(),
                    network,
                    ws_opts,
                    grpc_opts,
                    servername: node.sni.clone().filter(|_| node.tls),
                }
            }
            ProxyProtocol::Trojan { password } => {
                common.sni = node.sni.clone();
                ClashProxy::Trojan {
                    common,
                    password: password.clone(),
                    network,
                    ws_opts,
                    grpc_opts,
                }
            }
            ProxyProtocol::Shadowsocks { cipher, password } => {
                // ss profiles never carry udp or certificate options
                common.udp = None;
                common.skip_cert_verify = None;
                ClashProxy::Shadowsocks {
                    common,
                    cipher: cipher.clone(),
                    password: password.clone(),
                }
            }
        }
    }
}

impl From<&ProxyGroupConfig> for ClashProxyGroup {
    fn from(group: &ProxyGroupConfig) -> Self {
        match group.group_type {
            ProxyGroupType::Select => ClashProxyGroup::Select {
                name: group.name.clone(),
                proxies: group.proxies.clone(),
            },
            ProxyGroupType::URLTest => ClashProxyGroup::UrlTest {
                name: group.name.clone(),
                proxies: group.proxies.clone(),
                url: group.url.clone(),
                interval: group.interval,
                tolerance: group.tolerance,
            },
        }
    }
}

pub fn proxy_to_clash(nodes: &[ProxyNode]) -> Vec<ClashProxy> {
    nodes.iter().map(ClashProxy::from).collect()
}

pub fn convert_proxy_groups(groups: &[ProxyGroupConfig]) -> Vec<ClashProxyGroup> {
    groups.iter().map(ClashProxyGroup::from).collect()
}
