//! 环境接口
//!
//! 每个回调是一个独立能力：观测空间、动作空间、观测、奖励、终止、执行动作。
//! 桥（[`super::EnvBridge`]）只持有 trait 对象，不依赖具体环境。

use super::event_log::EventLog;
use super::space::{Action, Observation, Space};
use crate::net::{Network, NodeId};
use crate::sim::SimTime;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("action {action} is outside the action space of size {n}")]
    InvalidAction { action: usize, n: usize },
}

/// 环境回调可以读取的运行状态
pub struct EnvContext<'a> {
    pub now: SimTime,
    pub net: &'a mut Network,
    pub log: &'a EventLog,
}

pub trait Environment {
    fn observation_space(&self) -> Space;
    fn action_space(&self) -> Space;
    /// 只读采样，不改变仿真状态
    fn observe(&mut self, ctx: &mut EnvContext<'_>) -> Observation;
    fn reward(&self, ctx: &EnvContext<'_>) -> f64;
    /// 一旦为 true，之后一直为 true
    fn done(&mut self, ctx: &EnvContext<'_>) -> bool;
    fn apply_action(&mut self, action: Action, ctx: &mut EnvContext<'_>) -> Result<(), EnvError>;
}

/// 集群环境：观测被监视节点的 x 坐标，奖励为平均时延。
///
/// 动作目前只做校验和记录，不影响拓扑或路由；需要真实效果的控制器应实现自己的
/// [`Environment`]。
#[derive(Debug, Clone)]
pub struct ClusterEnv {
    monitored: Vec<NodeId>,
    low: f64,
    high: f64,
    horizon: SimTime,
    done: bool,
    last_action: Option<Action>,
    actions_applied: u64,
}

impl ClusterEnv {
    pub fn new(monitored: Vec<NodeId>, low: f64, high: f64, horizon: SimTime) -> Self {
        Self {
            monitored,
            low,
            high,
            horizon,
            done: false,
            last_action: None,
            actions_applied: 0,
        }
    }

    pub fn monitored(&self) -> &[NodeId] {
        &self.monitored
    }

    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    pub fn actions_applied(&self) -> u64 {
        self.actions_applied
    }
}

impl Environment for ClusterEnv {
    fn observation_space(&self) -> Space {
        Space::boxed(self.low, self.high, self.monitored.len())
    }

    fn action_space(&self) -> Space {
        Space::Discrete {
            n: self.monitored.len(),
        }
    }

    fn observe(&mut self, ctx: &mut EnvContext<'_>) -> Observation {
        self.monitored
            .iter()
            .map(|&n| ctx.net.position(n, ctx.now).x)
            .collect()
    }

    fn reward(&self, ctx: &EnvContext<'_>) -> f64 {
        // 没有样本时为 0.0
        ctx.log.mean_latency_secs().unwrap_or(0.0)
    }

    fn done(&mut self, ctx: &EnvContext<'_>) -> bool {
        if ctx.now >= self.horizon {
            self.done = true;
        }
        self.done
    }

    fn apply_action(&mut self, action: Action, _ctx: &mut EnvContext<'_>) -> Result<(), EnvError> {
        let n = self.monitored.len();
        if action.0 >= n {
            return Err(EnvError::InvalidAction { action: action.0, n });
        }
        debug!(action = action.0, "动作已接受（无拓扑效果）");
        self.last_action = Some(action);
        self.actions_applied += 1;
        Ok(())
    }
}
