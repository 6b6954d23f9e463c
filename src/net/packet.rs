//! 数据包类型
//!
//! 回显请求/应答数据包。路由按目的节点逐跳查表，包本身不携带路径。

use super::id::NodeId;
use crate::sim::SimTime;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    EchoRequest,
    EchoReply,
}

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub kind: PacketKind,
    pub src: NodeId,
    pub dst: NodeId,
    pub src_addr: Option<Ipv4Addr>,
    pub dst_addr: Ipv4Addr,
    pub port: u16,
    pub size_bytes: u32,
    /// 源端发出的时刻
    pub sent_at: SimTime,
    /// 已经经过的跳数
    pub hops: u32,
}

impl Packet {
    /// 前进一跳
    pub fn advance(mut self) -> Self {
        self.hops += 1;
        self
    }
}
