//! 网络拓扑管理
//!
//! 持有节点、链路、地址与路由表，负责逐跳转发。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use super::addr::Subnet;
use super::deliver_packet::DeliverPacket;
use super::id::{LinkId, NodeId};
use super::link::Link;
use super::mobility::{Mobility, Vector2};
use super::node::{Interface, Node, NodeRole};
use super::packet::{Packet, PacketKind};
use super::routing::RoutingTable;
use super::stats::Stats;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace, warn};

/// 网络拓扑
#[derive(Debug, Default)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    addr_owner: HashMap<Ipv4Addr, NodeId>,
    routing: RoutingTable,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Network {
    /// 添加节点
    pub fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, name, role));
        self.routing.mark_dirty();
        id
    }

    /// 在两个节点之间安装点到点链路（无向）
    pub fn connect(&mut self, a: NodeId, b: NodeId, delay: SimTime, data_rate_bps: u64) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(id, a, b, delay, data_rate_bps));
        self.edges.insert((a, b), id);
        self.edges.insert((b, a), id);
        self.routing.mark_dirty();
        trace!(?id, ?a, ?b, "安装点到点链路");
        id
    }

    /// 为链路安装地址：`a` 端取 `.1`，`b` 端取 `.2`。
    pub fn assign_subnet(&mut self, link: LinkId, subnet: Subnet) {
        let l = &mut self.links[link.0];
        l.subnet = Some(subnet);
        let ends = [(l.a, subnet.host(1)), (l.b, subnet.host(2))];
        for (node, addr) in ends {
            self.nodes[node.0].interfaces.push(Interface { link, addr, subnet });
            self.addr_owner.insert(addr, node);
        }
        debug!(?link, %subnet, "链路地址已安装");
    }

    pub fn set_mobility(&mut self, node: NodeId, mobility: Mobility) {
        self.nodes[node.0].mobility = mobility;
    }

    /// 重新计算全网路由
    pub fn populate_routing(&mut self) {
        let adj = self.adjacency();
        self.routing.rebuild(&adj);
        debug!(nodes = self.nodes.len(), links = self.links.len(), "路由表已填充");
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// 两个节点之间的直连链路
    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.edges.get(&(a, b)).copied()
    }

    /// 无向邻接表，邻居按链路安装顺序排列
    pub fn adjacency(&self) -> Vec<Vec<NodeId>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for l in &self.links {
            adj[l.a.0].push(l.b);
            adj[l.b.0].push(l.a);
        }
        adj
    }

    /// 地址属于哪个节点
    pub fn resolve(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.addr_owner.get(&addr).copied()
    }

    /// 节点在 `now` 时刻的位置
    pub fn position(&mut self, node: NodeId, now: SimTime) -> Vector2 {
        self.nodes[node.0].mobility.position_at(now)
    }

    /// 创建数据包
    pub fn make_packet(
        &mut self,
        kind: PacketKind,
        flow_id: u64,
        src: NodeId,
        dst: NodeId,
        dst_addr: Ipv4Addr,
        port: u16,
        size_bytes: u32,
        sent_at: SimTime,
    ) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        let src_addr = self.nodes[src.0].interfaces.first().map(|iface| iface.addr);
        Packet {
            id,
            flow_id,
            kind,
            src,
            dst,
            src_addr,
            dst_addr,
            port,
            size_bytes,
            sent_at,
            hops: 0,
        }
    }

    /// 从指定节点向目的地转发一跳；没有路由时丢包并返回 false。
    #[tracing::instrument(skip(self, sim), fields(pkt_id = pkt.id, from = ?from, dst = ?pkt.dst, hops = pkt.hops))]
    pub fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) -> bool {
        if from == pkt.dst {
            sim.schedule(sim.now(), DeliverPacket { to: from, pkt });
            return true;
        }
        if self.routing.is_dirty() {
            self.populate_routing();
        }

        let Some(to) = self.routing.next_hop(from, pkt.dst) else {
            warn!("没有到目的节点的路由，丢包");
            self.stats.dropped_pkts += 1;
            return false;
        };
        let Some(link_id) = self.link_between(from, to) else {
            warn!(?to, "路由下一跳没有直连链路，丢包");
            self.stats.dropped_pkts += 1;
            return false;
        };

        let now = sim.now();
        let link = &mut self.links[link_id.0];
        let Some((depart, arrive)) = link.transmit(from, pkt.size_bytes, now) else {
            self.stats.dropped_pkts += 1;
            return false;
        };
        trace!(?link_id, ?to, ?depart, ?arrive, "计算传输时间");

        self.stats.forwarded_hops += 1;
        sim.schedule(arrive, DeliverPacket { to, pkt: pkt.advance() });
        true
    }
}
