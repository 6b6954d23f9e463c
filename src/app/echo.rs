//! 回显服务端与客户端
//!
//! 客户端从 `start` 开始每隔 `interval` 发一个请求，最多 `max_packets` 个，到 `stop` 为止；
//! 服务端在端口匹配且尚未停止时把请求原样回给发送方。

use crate::net::{NetWorld, NodeId};
use crate::sim::{Event, SimTime, Simulator, World};
use std::net::Ipv4Addr;
use tracing::trace;

/// 节点上的回显服务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoServer {
    pub port: u16,
    pub stop_at: SimTime,
}

impl EchoServer {
    pub fn accepts(&self, port: u16, now: SimTime) -> bool {
        self.port == port && now < self.stop_at
    }
}

/// 回显客户端：每次执行发一个请求，然后在一个间隔后重新调度自己。
#[derive(Debug, Clone)]
pub struct EchoClient {
    pub flow_id: u64,
    pub node: NodeId,
    pub target: Ipv4Addr,
    pub port: u16,
    pub packet_bytes: u32,
    pub remaining: u64,
    pub interval: SimTime,
    pub stop_at: SimTime,
}

impl EchoClient {
    /// 在 `start` 时刻启动客户端
    pub fn start(self, sim: &mut Simulator, start: SimTime) {
        sim.schedule(start, self);
    }
}

impl Event for EchoClient {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let mut me = *self;
        let now = sim.now();
        if me.remaining == 0 || now >= me.stop_at {
            trace!(node = me.node.0, "回显客户端结束");
            return;
        }

        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        w.send_echo(&me, sim);

        me.remaining -= 1;
        let next_at = now.saturating_add(me.interval);
        if me.remaining > 0 && next_at < me.stop_at {
            sim.schedule(next_at, me);
        }
    }
}
