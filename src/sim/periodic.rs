//! 周期任务
//!
//! 把“执行完后在固定间隔后重新提交自己”的定时器显式建模为：任务 + 固定周期 + 完成后重新提交。
//! 任务本身只关心一次执行的逻辑，是否继续由返回值决定，测试可以直接驱动 `run_once`。

use super::event::Event;
use super::simulator::Simulator;
use super::time::SimTime;
use super::world::World;
use tracing::trace;

/// 一次执行后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// 在一个周期之后再次执行
    Continue,
    /// 不再重新提交
    Stop,
}

/// 周期任务：每个 tick 被调用一次。
pub trait PeriodicTask: Send + 'static {
    fn run_once(&mut self, sim: &mut Simulator, world: &mut dyn World) -> TaskControl;
}

/// 事件：执行任务，然后按固定周期重新提交自身。
///
/// 没有外部取消：要么任务返回 `Stop`，要么仿真时钟停止。
pub struct Periodic<T> {
    pub task: T,
    pub period: SimTime,
}

impl<T: PeriodicTask> Periodic<T> {
    pub fn new(task: T, period: SimTime) -> Self {
        Self { task, period }
    }

    /// 在 `first_at` 时刻开始周期执行
    pub fn start(self, sim: &mut Simulator, first_at: SimTime) {
        sim.schedule(first_at, self);
    }
}

impl<T: PeriodicTask> Event for Periodic<T> {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let mut me = *self;
        match me.task.run_once(sim, world) {
            TaskControl::Continue if me.period > SimTime::ZERO => {
                trace!(
                    task = std::any::type_name::<T>(),
                    next_at = ?sim.now().saturating_add(me.period),
                    "周期任务重新提交"
                );
                let period = me.period;
                sim.schedule_in(period, me);
            }
            // 周期为 0 会在同一时刻无限循环，视为只执行一次。
            TaskControl::Continue | TaskControl::Stop => {}
        }
    }
}
