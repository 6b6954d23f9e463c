//! 网络世界实现
//!
//! 一次运行的全部状态：网络、事件日志、环境桥和监视器采样。所有回调都经由仿真时钟
//! 串行调用，按引用访问这里的状态，不存在全局变量。

use super::id::NodeId;
use super::network::Network;
use super::packet::{Packet, PacketKind};
use crate::app::echo::EchoClient;
use crate::gym::{EnvBridge, EventLog, TickSample};
use crate::sim::{Simulator, World};
use std::any::Any;
use tracing::{debug, info, warn};

/// 集群仿真的世界：持有 Network 以及围绕它的观测状态。
#[derive(Default)]
pub struct NetWorld {
    pub net: Network,
    pub log: EventLog,
    pub bridge: Option<EnvBridge>,
    pub ticks: Vec<TickSample>,
}

impl NetWorld {
    pub fn with_log(log: EventLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// 数据包到达节点 `at`：未到目的地则继续转发，否则交给目的节点的应用处理。
    #[tracing::instrument(skip(self, pkt, sim), fields(pkt_id = pkt.id, kind = ?pkt.kind))]
    pub fn on_packet(&mut self, at: NodeId, pkt: Packet, sim: &mut Simulator) {
        if at != pkt.dst {
            self.net.forward_from(at, pkt, sim);
            return;
        }

        let now = sim.now();
        match pkt.kind {
            PacketKind::EchoRequest => {
                self.net.stats.received_pkts += 1;
                self.net.stats.received_bytes += pkt.size_bytes as u64;

                if self.log.is_watched(at) {
                    self.log.on_receive(at, now);
                    match self.log.latency_for(at, now) {
                        Ok(sample) => info!(
                            node = at.0,
                            latency_s = sample.secs(),
                            "✅ 节点收到数据包"
                        ),
                        Err(e) => {
                            warn!(error = %e, "接收无法配对发送时刻，忽略该样本");
                            self.net.stats.unmatched_receives += 1;
                        }
                    }
                }

                let serves = self
                    .net
                    .node(at)
                    .echo_server()
                    .is_some_and(|s| s.accepts(pkt.port, now));
                if serves {
                    self.reply(at, &pkt, sim);
                }
            }
            PacketKind::EchoReply => {
                self.net.stats.echo_replies += 1;
                debug!(node = at.0, rtt_s = now.secs_since(pkt.sent_at), "回显应答回到客户端");
            }
        }
    }

    fn reply(&mut self, at: NodeId, req: &Packet, sim: &mut Simulator) {
        let Some(dst_addr) = req.src_addr else {
            warn!(src = ?req.src, "请求没有源地址，无法应答");
            return;
        };
        let reply = self.net.make_packet(
            PacketKind::EchoReply,
            req.flow_id,
            at,
            req.src,
            dst_addr,
            req.port,
            req.size_bytes,
            sim.now(),
        );
        self.net.forward_from(at, reply, sim);
    }

    /// 客户端发出一个回显请求；发送路径同时为目的节点登记期望的发送时刻。
    pub fn send_echo(&mut self, client: &EchoClient, sim: &mut Simulator) {
        let now = sim.now();
        let Some(dst) = self.net.resolve(client.target) else {
            warn!(target = %client.target, "目的地址不属于任何节点，丢包");
            self.net.stats.dropped_pkts += 1;
            return;
        };
        let pkt = self.net.make_packet(
            PacketKind::EchoRequest,
            client.flow_id,
            client.node,
            dst,
            client.target,
            client.port,
            client.packet_bytes,
            now,
        );
        self.net.stats.sent_pkts += 1;
        self.log.on_send(client.node, now);
        self.log.expect_arrival(dst, now);
        debug!(node = client.node.0, dst = dst.0, "客户端发出数据包");
        self.net.forward_from(client.node, pkt, sim);
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
