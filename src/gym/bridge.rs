//! 环境桥
//!
//! 以固定仿真时间间隔驱动环境回调：第一次发布观测/动作空间，之后每步采样观测、
//! 奖励与终止标志，交给控制器选择动作，再把动作交回环境执行。
//! 步进节奏与周期监视器相互独立。

use super::agent::Agent;
use super::env::{EnvContext, Environment};
use super::space::{Action, Observation, Space};
use crate::net::NetWorld;
use crate::sim::{PeriodicTask, SimTime, Simulator, TaskControl, World};
use serde::Serialize;
use tracing::{debug, info, warn};

/// 一步交给控制器的状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepState {
    pub step: u64,
    pub time: SimTime,
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
}

/// 一步的完整记录（含控制器的动作及其结果）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub state: StepState,
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

pub struct EnvBridge {
    env: Box<dyn Environment>,
    agent: Box<dyn Agent>,
    spaces: Option<(Space, Space)>,
    next_step: u64,
    finished: bool,
    records: Vec<StepRecord>,
}

impl EnvBridge {
    pub fn new(env: Box<dyn Environment>, agent: Box<dyn Agent>) -> Self {
        Self {
            env,
            agent,
            spaces: None,
            next_step: 0,
            finished: false,
            records: Vec::new(),
        }
    }

    pub fn observation_space(&self) -> Option<&Space> {
        self.spaces.as_ref().map(|(obs, _)| obs)
    }

    pub fn action_space(&self) -> Option<&Space> {
        self.spaces.as_ref().map(|(_, act)| act)
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 执行一步；终止后返回 `Stop`，不再重新提交。
    pub fn notify(&mut self, ctx: &mut EnvContext<'_>) -> TaskControl {
        if self.finished {
            return TaskControl::Stop;
        }
        if self.spaces.is_none() {
            let obs_space = self.env.observation_space();
            let act_space = self.env.action_space();
            info!(?obs_space, ?act_space, "🎮 环境空间已发布");
            self.agent.reset(&obs_space, &act_space);
            self.spaces = Some((obs_space, act_space));
        }

        let observation = self.env.observe(ctx);
        let reward = self.env.reward(ctx);
        let done = self.env.done(ctx);
        let state = StepState {
            step: self.next_step,
            time: ctx.now,
            observation,
            reward,
            done,
        };
        debug!(step = state.step, now = %ctx.now, reward, done, obs = ?state.observation, "环境步进");

        let mut action = None;
        let mut rejected = None;
        if !done {
            if let Some(a) = self.agent.act(&state) {
                match self.env.apply_action(a, ctx) {
                    Ok(()) => action = Some(a),
                    Err(e) => {
                        warn!(error = %e, "控制器动作被拒绝");
                        rejected = Some(e.to_string());
                    }
                }
            }
        }

        self.records.push(StepRecord {
            state,
            action,
            rejected,
        });
        self.next_step += 1;

        if done {
            info!(steps = self.next_step, now = %ctx.now, "🏁 环境终止");
            self.finished = true;
            TaskControl::Stop
        } else {
            TaskControl::Continue
        }
    }
}

/// 周期任务：每个步进间隔读取一次环境状态。
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvStep;

impl PeriodicTask for EnvStep {
    fn run_once(&mut self, sim: &mut Simulator, world: &mut dyn World) -> TaskControl {
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");

        // 暂时把桥取出来，避免 &mut bridge 与 &mut world 的重叠借用。
        let Some(mut bridge) = w.bridge.take() else {
            return TaskControl::Stop;
        };
        let mut ctx = EnvContext {
            now: sim.now(),
            net: &mut w.net,
            log: &w.log,
        };
        let control = bridge.notify(&mut ctx);
        w.bridge = Some(bridge);
        control
    }
}
