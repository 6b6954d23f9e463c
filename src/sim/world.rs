//! 世界 trait
//!
//! 定义仿真世界接口。一次运行的全部可变状态都挂在 World 上，由事件回调按引用访问。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现（例如集群拓扑、事件日志、环境桥）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
