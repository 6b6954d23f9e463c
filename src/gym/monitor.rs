//! 周期监视器
//!
//! 每个 tick 采样一次聚合计数器，并把当前全部收发/时延记录转储到可选的输出。
//! 状态机只有两个状态：`Idle`（第一次 tick 之前）和 `Running`。自身没有终止条件，
//! 随仿真时钟停止而停止。

use crate::net::{NetWorld, Stats};
use crate::sim::{PeriodicTask, SimTime, Simulator, TaskControl, World};
use serde::Serialize;
use std::io::Write;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running { ticks: u64 },
}

/// 一次 tick 的采样
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSample {
    pub time: SimTime,
    pub stats: Stats,
    pub send_records: usize,
    pub receive_records: usize,
    pub latency_samples: usize,
    pub mean_latency_s: Option<f64>,
}

pub struct PeriodicMonitor {
    state: MonitorState,
    out: Option<Box<dyn Write + Send>>,
}

impl PeriodicMonitor {
    pub fn new(out: Option<Box<dyn Write + Send>>) -> Self {
        Self {
            state: MonitorState::Idle,
            out,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }
}

impl PeriodicTask for PeriodicMonitor {
    fn run_once(&mut self, sim: &mut Simulator, world: &mut dyn World) -> TaskControl {
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        let now = sim.now();

        let ticks = match self.state {
            MonitorState::Idle => 1,
            MonitorState::Running { ticks } => ticks + 1,
        };
        self.state = MonitorState::Running { ticks };

        let sample = TickSample {
            time: now,
            stats: w.net.stats.clone(),
            send_records: w.log.send_count(),
            receive_records: w.log.receive_count(),
            latency_samples: w.log.all_samples().len(),
            mean_latency_s: w.log.mean_latency_secs(),
        };
        info!(
            tick = ticks,
            now = %now,
            sent = sample.stats.sent_pkts,
            received = sample.stats.received_pkts,
            samples = sample.latency_samples,
            "📊 监视器采样"
        );

        if let Some(out) = self.out.as_mut() {
            let dumped = writeln!(out, "# tick {ticks} at {now}")
                .and_then(|()| w.log.write_report(out.as_mut()))
                .and_then(|()| out.flush());
            if let Err(e) = dumped {
                warn!(error = %e, "监视器输出写入失败，之后不再转储");
                self.out = None;
            }
        }

        w.ticks.push(sample);
        TaskControl::Continue
    }
}
