//! 分层集群拓扑构建
//!
//! 三层结构：成员节点、每组一个头节点、头节点之间的骨干链路。
//! 构建顺序固定（只影响地址分配的可复现性，不影响连通性）：
//! 1. 每组创建成员与头节点；
//! 2. 组内成员两两全连接；
//! 3. 任意两组的头节点之间一条骨干链路；
//! 4. 每个成员到本组头节点一条辐条链路；
//! 5. 安装移动模型（成员随机游走，头节点固定）；
//! 6. 按 2、3、4 的顺序为每条链路分配一个新子网并安装地址。

use crate::net::{
    GroupId, LinkId, Mobility, NetWorld, Network, NodeId, NodeRole, RandomWalk2d, Rect,
    SubnetAllocator, Vector2, WalkParams,
};
use crate::sim::{SimTime, TopologySpec};
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::{debug, info};

/// 最左侧一组的 x 坐标
pub const LEFTMOST_X: f64 = 10.0;
/// 相邻两组之间的 x 间距
pub const GROUP_DX: f64 = 30.0;
/// 头节点的基准 y 坐标（奇数组乘 1.5）
pub const HEAD_Y: f64 = 10.0;
/// 成员初始网格
pub const MEMBER_Y: f64 = 60.0;
pub const GRID_DX: f64 = 10.0;
pub const GRID_DY: f64 = 30.0;
pub const GRID_WIDTH: usize = 3;
/// 成员随机游走的纵向边界
pub const WALK_Y: (f64, f64) = (-100.0, 100.0);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("group_count must be positive")]
    ZeroGroups,
    #[error("nodes_per_group must be positive")]
    ZeroNodesPerGroup,
    #[error("subnet mask {0} cannot hold one /24 range per link")]
    InvalidMask(Ipv4Addr),
    #[error("topology needs {needed} subnets but only {available} are available")]
    AddressSpaceExhausted { needed: usize, available: usize },
}

/// 集群拓扑配置选项
#[derive(Debug, Clone)]
pub struct ClusterOpts {
    pub group_count: usize,
    pub nodes_per_group: usize,
    pub data_rate_bps: u64,
    pub delay: SimTime,
    pub subnet_prefix: [u8; 2],
    pub subnet_mask: Ipv4Addr,
    pub seed: u64,
    pub mobility: bool,
}

impl Default for ClusterOpts {
    fn default() -> Self {
        Self::from_spec(&TopologySpec::default())
    }
}

impl ClusterOpts {
    pub fn from_spec(spec: &TopologySpec) -> Self {
        Self {
            group_count: spec.group_count,
            nodes_per_group: spec.nodes_per_group,
            data_rate_bps: spec.data_rate_bps,
            delay: SimTime::from_secs_f64(spec.delay_ms / 1e3),
            subnet_prefix: spec.subnet_prefix,
            subnet_mask: spec.subnet_mask,
            seed: spec.seed,
            mobility: spec.mobility,
        }
    }

    /// `g·C(n,2) + C(g,2) + g·n`；溢出时为 None
    pub fn link_count(&self) -> Option<usize> {
        let g = self.group_count;
        let n = self.nodes_per_group;
        let mesh = g.checked_mul(n.checked_mul(n.saturating_sub(1))? / 2)?;
        let backbone = g.checked_mul(g.saturating_sub(1))? / 2;
        let spokes = g.checked_mul(n)?;
        mesh.checked_add(backbone)?.checked_add(spokes)
    }

    fn validate(&self) -> Result<(), BuildError> {
        if self.group_count == 0 {
            return Err(BuildError::ZeroGroups);
        }
        if self.nodes_per_group == 0 {
            return Err(BuildError::ZeroNodesPerGroup);
        }
        if !SubnetAllocator::mask_is_valid(self.subnet_mask) {
            return Err(BuildError::InvalidMask(self.subnet_mask));
        }
        let available = SubnetAllocator::capacity();
        let needed = self.link_count().unwrap_or(usize::MAX);
        if needed > available {
            return Err(BuildError::AddressSpaceExhausted { needed, available });
        }
        Ok(())
    }
}

/// 一个分组：有序成员 + 唯一头节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub members: Vec<NodeId>,
    pub head: NodeId,
}

#[derive(Debug, Clone)]
pub struct ClusterTopology {
    pub groups: Vec<Group>,
    /// 组内全连接链路，按组、再按 (i, j) 字典序
    pub mesh_links: Vec<LinkId>,
    /// 头节点骨干链路，按 (g1, g2) 字典序
    pub backbone_links: Vec<LinkId>,
    /// `spoke_links[g][i]`：第 g 组第 i 个成员到头节点
    pub spoke_links: Vec<Vec<LinkId>>,
}

impl ClusterTopology {
    /// 全部链路，按接线（也即地址分配）顺序
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.mesh_links
            .iter()
            .chain(self.backbone_links.iter())
            .chain(self.spoke_links.iter().flatten())
            .copied()
    }

    pub fn link_count(&self) -> usize {
        self.mesh_links.len()
            + self.backbone_links.len()
            + self.spoke_links.iter().map(Vec::len).sum::<usize>()
    }

    pub fn heads(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups.iter().map(|g| g.head)
    }

    /// 所有节点（成员与头节点）
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().copied().chain(std::iter::once(g.head)))
    }

    pub fn member(&self, group: usize, index: usize) -> Option<NodeId> {
        self.groups.get(group)?.members.get(index).copied()
    }

    /// 成员在其辐条链路上的地址（回显客户端用它寻址服务端）
    pub fn member_address(&self, net: &Network, group: usize, index: usize) -> Option<Ipv4Addr> {
        let member = self.member(group, index)?;
        let link = *self.spoke_links.get(group)?.get(index)?;
        net.node(member).addr_on(link)
    }
}

fn head_position(group: usize) -> Vector2 {
    let y = if group % 2 == 0 { HEAD_Y } else { HEAD_Y * 1.5 };
    Vector2::new(LEFTMOST_X + group as f64 * GROUP_DX, y)
}

fn member_start(group: usize, index: usize) -> Vector2 {
    Vector2::new(
        LEFTMOST_X + group as f64 * GROUP_DX + (index % GRID_WIDTH) as f64 * GRID_DX,
        MEMBER_Y + (index / GRID_WIDTH) as f64 * GRID_DY,
    )
}

fn walk_bounds(group: usize) -> Rect {
    let x0 = LEFTMOST_X + group as f64 * GROUP_DX;
    Rect {
        x_min: x0,
        x_max: x0 + GROUP_DX,
        y_min: WALK_Y.0,
        y_max: WALK_Y.1,
    }
}

fn walk_seed(seed: u64, node: NodeId) -> u64 {
    seed ^ (node.0 as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// 构建集群拓扑。配置错误在创建任何节点或链路之前返回。
#[tracing::instrument(skip(world), fields(groups = opts.group_count, per_group = opts.nodes_per_group))]
pub fn build_cluster(world: &mut NetWorld, opts: &ClusterOpts) -> Result<ClusterTopology, BuildError> {
    opts.validate()?;
    let net = &mut world.net;
    let g = opts.group_count;
    let n = opts.nodes_per_group;

    // 1. 节点
    let mut groups = Vec::with_capacity(g);
    for c in 0..g {
        let group = GroupId(c);
        let members = (0..n)
            .map(|i| net.add_node(format!("g{c}_m{i}"), NodeRole::Member { group, index: i }))
            .collect();
        let head = net.add_node(format!("g{c}_head"), NodeRole::Head { group });
        groups.push(Group {
            id: group,
            members,
            head,
        });
    }

    // 2. 组内全连接
    let mut mesh_links = Vec::with_capacity(g * n * n.saturating_sub(1) / 2);
    for grp in &groups {
        for i in 0..n {
            for j in (i + 1)..n {
                mesh_links.push(net.connect(grp.members[i], grp.members[j], opts.delay, opts.data_rate_bps));
            }
        }
    }

    // 3. 头节点骨干
    let mut backbone_links = Vec::with_capacity(g * g.saturating_sub(1) / 2);
    for a in 0..g {
        for b in (a + 1)..g {
            backbone_links.push(net.connect(groups[a].head, groups[b].head, opts.delay, opts.data_rate_bps));
        }
    }

    // 4. 成员到头节点
    let spoke_links: Vec<Vec<LinkId>> = groups
        .iter()
        .map(|grp| {
            grp.members
                .iter()
                .map(|&m| net.connect(m, grp.head, opts.delay, opts.data_rate_bps))
                .collect()
        })
        .collect();

    // 5. 移动模型
    for (c, grp) in groups.iter().enumerate() {
        for (i, &m) in grp.members.iter().enumerate() {
            let start = member_start(c, i);
            let mobility = if opts.mobility {
                Mobility::RandomWalk(RandomWalk2d::new(
                    start,
                    walk_bounds(c),
                    WalkParams::default(),
                    walk_seed(opts.seed, m),
                ))
            } else {
                Mobility::Fixed(walk_bounds(c).clamp(start))
            };
            net.set_mobility(m, mobility);
        }
        net.set_mobility(grp.head, Mobility::Fixed(head_position(c)));
    }

    let topo = ClusterTopology {
        groups,
        mesh_links,
        backbone_links,
        spoke_links,
    };

    // 6. 地址：每条链路一个新子网
    let mut subnets = SubnetAllocator::new(opts.subnet_prefix, opts.subnet_mask);
    for link in topo.links() {
        let subnet = subnets.next().ok_or(BuildError::AddressSpaceExhausted {
            needed: topo.link_count(),
            available: SubnetAllocator::capacity(),
        })?;
        net.assign_subnet(link, subnet);
    }
    net.populate_routing();

    debug!(subnets = subnets.allocated(), "地址分配完成");
    info!(
        nodes = net.node_count(),
        links = topo.link_count(),
        "🏗️  集群拓扑构建完成"
    );
    Ok(topo)
}
