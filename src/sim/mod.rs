//! 仿真核心模块
//!
//! 此模块包含事件驱动仿真的核心组件，如仿真时间、事件、世界、周期任务和仿真器，
//! 以及运行场景的配置。

// 子模块声明
mod event;
mod periodic;
mod scenario;
mod scheduled_event;
mod simulator;
mod time;
mod world;

// 重新导出公共接口
pub use event::Event;
pub use periodic::{Periodic, PeriodicTask, TaskControl};
pub use scenario::{
    AgentKind, EchoClientSpec, EnvSpec, MonitorSpec, RunSpec, ScenarioError, ScenarioSpec,
    TopologySpec, TrafficSpec,
};
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
