//! 网络模拟模块
//!
//! 此模块包含网络模拟的核心组件，如节点、链路、地址、移动模型、数据包和网络拓扑。

// 子模块声明
mod addr;
mod deliver_packet;
mod id;
mod link;
mod mobility;
mod net_world;
mod network;
mod node;
mod packet;
mod routing;
mod stats;

// 重新导出公共接口
pub use addr::{FIRST_SUBNET_INDEX, LAST_SUBNET_INDEX, Subnet, SubnetAllocator};
pub use deliver_packet::DeliverPacket;
pub use id::{GroupId, LinkId, NodeId};
pub use link::Link;
pub use mobility::{Mobility, RandomWalk2d, Rect, Vector2, WalkParams};
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{Interface, Node, NodeRole};
pub use packet::{Packet, PacketKind};
pub use routing::RoutingTable;
pub use stats::Stats;
