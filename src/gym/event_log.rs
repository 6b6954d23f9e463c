//! 收发事件日志与时延配对
//!
//! 按节点记录发送/接收时间戳（有序多重映射，只追加），并把每次接收与该节点
//! “下一个尚未消费的发送时刻”按先进先出配对，得到时延样本。
//!
//! 发送时刻有两种来源：
//! - [`SendSchedule::PerNode`]：发送路径调用 [`EventLog::expect_arrival`]，为目的节点排队；
//! - [`SendSchedule::Shared`]：固定的全局发送时刻表，每个节点一个游标。
//!
//! 配对严格按到达顺序进行，不排序也不找最近时间戳，因此对丢包和乱序敏感。
//! 时刻表耗尽时返回 [`EventLogError::ScheduleExhausted`]，不追加样本。

use crate::net::NodeId;
use crate::sim::SimTime;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventLogError {
    #[error("node {node:?} received more packets than its send schedule holds ({consumed} already matched)")]
    ScheduleExhausted { node: NodeId, consumed: usize },
}

/// 两波客户端（第二组 5–20 s，第三组 10–25 s）叠加后的发送时刻表（秒）。
/// 两波重叠的 10–20 s 内每秒出现两次。
pub const TWO_WAVE_SEND_TIMES_S: [f64; 32] = [
    5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 10.0, 11.0, 11.0, 12.0, 12.0, 13.0, 13.0, 14.0, 14.0, 15.0,
    15.0, 16.0, 16.0, 17.0, 17.0, 18.0, 18.0, 19.0, 19.0, 20.0, 20.0, 21.0, 22.0, 23.0, 24.0, 25.0,
];

/// 配对用的发送时刻来源
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SendSchedule {
    #[default]
    PerNode,
    Shared(Vec<SimTime>),
}

impl SendSchedule {
    pub fn shared_secs(times: &[f64]) -> Self {
        SendSchedule::Shared(times.iter().map(|&t| SimTime::from_secs_f64(t)).collect())
    }
}

/// 一个时延样本：接收时刻减去配对的发送时刻
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySample {
    pub node: NodeId,
    pub sent_at: SimTime,
    pub received_at: SimTime,
}

impl LatencySample {
    /// 时延（秒）。共享时刻表配错时可能为负。
    pub fn secs(&self) -> f64 {
        self.received_at.secs_since(self.sent_at)
    }
}

#[derive(Debug, Default)]
pub struct EventLog {
    schedule: SendSchedule,
    watched: BTreeSet<NodeId>,
    sends: BTreeMap<NodeId, Vec<SimTime>>,
    receives: BTreeMap<NodeId, Vec<SimTime>>,
    cursors: HashMap<NodeId, usize>,
    pending: HashMap<NodeId, VecDeque<SimTime>>,
    samples: Vec<LatencySample>,
}

impl EventLog {
    pub fn new(schedule: SendSchedule) -> Self {
        Self {
            schedule,
            ..Self::default()
        }
    }

    /// 把节点登记为时延汇点
    pub fn watch(&mut self, node: NodeId) {
        self.watched.insert(node);
    }

    pub fn is_watched(&self, node: NodeId) -> bool {
        self.watched.contains(&node)
    }

    pub fn watched(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.watched.iter().copied()
    }

    pub fn on_send(&mut self, node: NodeId, t: SimTime) {
        self.sends.entry(node).or_default().push(t);
    }

    pub fn on_receive(&mut self, node: NodeId, t: SimTime) {
        self.receives.entry(node).or_default().push(t);
    }

    /// 发送路径登记：发往 `dst` 的一个包在 `sent_at` 发出。共享时刻表模式下忽略。
    pub fn expect_arrival(&mut self, dst: NodeId, sent_at: SimTime) {
        if matches!(self.schedule, SendSchedule::PerNode) {
            self.pending.entry(dst).or_default().push_back(sent_at);
        }
    }

    /// 把 `node` 在 `received_at` 的一次接收与其下一个未消费的发送时刻配对，
    /// 追加样本并把游标前移一位。
    pub fn latency_for(&mut self, node: NodeId, received_at: SimTime) -> Result<LatencySample, EventLogError> {
        let consumed = self.cursors.get(&node).copied().unwrap_or(0);
        let sent_at = match &self.schedule {
            SendSchedule::Shared(times) => times.get(consumed).copied(),
            SendSchedule::PerNode => self.pending.get_mut(&node).and_then(VecDeque::pop_front),
        }
        .ok_or(EventLogError::ScheduleExhausted { node, consumed })?;

        self.cursors.insert(node, consumed + 1);
        let sample = LatencySample {
            node,
            sent_at,
            received_at,
        };
        self.samples.push(sample);
        Ok(sample)
    }

    /// 已配对的次数（游标位置）
    pub fn cursor(&self, node: NodeId) -> usize {
        self.cursors.get(&node).copied().unwrap_or(0)
    }

    /// 全部样本，按到达顺序
    pub fn all_samples(&self) -> &[LatencySample] {
        &self.samples
    }

    pub fn mean_latency_secs(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(LatencySample::secs).sum();
        Some(sum / self.samples.len() as f64)
    }

    pub fn sends_of(&self, node: NodeId) -> &[SimTime] {
        self.sends.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn receives_of(&self, node: NodeId) -> &[SimTime] {
        self.receives.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn send_count(&self) -> usize {
        self.sends.values().map(Vec::len).sum()
    }

    pub fn receive_count(&self) -> usize {
        self.receives.values().map(Vec::len).sum()
    }

    /// 文本转储：全部发送、接收记录和时延样本。
    pub fn write_report(&self, w: &mut dyn Write) -> io::Result<()> {
        for (node, times) in &self.sends {
            for t in times {
                writeln!(w, "send\t{}\t{}", node.0, t)?;
            }
        }
        for (node, times) in &self.receives {
            for t in times {
                writeln!(w, "recv\t{}\t{}", node.0, t)?;
            }
        }
        for s in &self.samples {
            writeln!(w, "latency\t{}\t{:.9}", s.node.0, s.secs())?;
        }
        Ok(())
    }
}
