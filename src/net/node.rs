//! 节点类型
//!
//! 节点属于且只属于一个分组，角色是普通成员或该分组的头节点。

use super::addr::Subnet;
use super::id::{GroupId, LinkId, NodeId};
use super::mobility::Mobility;
use crate::app::echo::EchoServer;
use std::net::Ipv4Addr;

/// 节点在分组中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Member { group: GroupId, index: usize },
    Head { group: GroupId },
}

impl NodeRole {
    pub fn group(&self) -> GroupId {
        match *self {
            NodeRole::Member { group, .. } | NodeRole::Head { group } => group,
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, NodeRole::Head { .. })
    }
}

/// 安装在某条链路上的网络接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    pub link: LinkId,
    pub addr: Ipv4Addr,
    pub subnet: Subnet,
}

/// 网络节点
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    role: NodeRole,
    pub(crate) mobility: Mobility,
    pub(crate) interfaces: Vec<Interface>,
    pub(crate) echo_server: Option<EchoServer>,
}

impl Node {
    /// 创建新节点（默认固定在原点，没有接口）
    pub fn new(id: NodeId, name: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            mobility: Mobility::default(),
            interfaces: Vec::new(),
            echo_server: None,
        }
    }

    /// 获取节点标识符
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 获取节点名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// 节点在指定链路上的地址
    pub fn addr_on(&self, link: LinkId) -> Option<Ipv4Addr> {
        self.interfaces
            .iter()
            .find(|iface| iface.link == link)
            .map(|iface| iface.addr)
    }

    pub fn echo_server(&self) -> Option<&EchoServer> {
        self.echo_server.as_ref()
    }

    pub fn set_echo_server(&mut self, server: EchoServer) {
        self.echo_server = Some(server);
    }
}
