//! 时延跟踪与环境桥
//!
//! 事件日志、周期监视器，以及把仿真暴露给外部控制器的环境接口。

mod agent;
mod bridge;
mod env;
mod event_log;
mod monitor;
mod space;

pub use agent::{Agent, CyclicAgent, IdleAgent};
pub use bridge::{EnvBridge, EnvStep, StepRecord, StepState};
pub use env::{ClusterEnv, EnvContext, EnvError, Environment};
pub use event_log::{EventLog, EventLogError, LatencySample, SendSchedule, TWO_WAVE_SEND_TIMES_S};
pub use monitor::{MonitorState, PeriodicMonitor, TickSample};
pub use space::{Action, Observation, Space};
