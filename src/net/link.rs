//! 链路类型
//!
//! 点到点全双工链路：两个方向各自串行化发送，共享速率与传播时延。

use super::addr::Subnet;
use super::id::{LinkId, NodeId};
use crate::sim::SimTime;

/// 点到点链路（无向节点对）
#[derive(Debug)]
pub struct Link {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub delay: SimTime,
    pub data_rate_bps: u64,
    /// 安装地址后才有值；一条链路恰好拥有一个子网
    pub subnet: Option<Subnet>,
    /// 两个方向（a->b, b->a）各自的发送忙碌截止时间
    busy_until: [SimTime; 2],
}

impl Link {
    /// 创建新链路
    pub fn new(id: LinkId, a: NodeId, b: NodeId, delay: SimTime, data_rate_bps: u64) -> Self {
        Self {
            id,
            a,
            b,
            delay,
            data_rate_bps,
            subnet: None,
            busy_until: [SimTime::ZERO; 2],
        }
    }

    fn direction(&self, from: NodeId) -> Option<usize> {
        if from == self.a {
            Some(0)
        } else if from == self.b {
            Some(1)
        } else {
            None
        }
    }

    /// 计算传输指定字节数所需的时间
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        if self.data_rate_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bps = self.data_rate_bps as u128;
        let nanos = ((bytes as u128) * 8 * 1_000_000_000 + (bps - 1)) / bps;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 从 `from` 一端发送 `bytes` 字节：返回 (发送完成时刻, 到达对端时刻)。
    pub(crate) fn transmit(&mut self, from: NodeId, bytes: u32, now: SimTime) -> Option<(SimTime, SimTime)> {
        let dir = self.direction(from)?;
        let start = now.max(self.busy_until[dir]);
        let depart = start.saturating_add(self.tx_time(bytes));
        self.busy_until[dir] = depart;
        Some((depart, depart.saturating_add(self.delay)))
    }
}
