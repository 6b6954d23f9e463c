//! 静态最短路路由
//!
//! 拓扑安装完成后一次性计算全网最短跳数路由（相当于“填充全局路由表”）。
//! 对每个目的节点在无向图上做 BFS；等价下一跳中取编号最小的，保证每次运行结果相同。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    dirty: bool,
    /// (from, dst) -> 下一跳
    next_hop: HashMap<(NodeId, NodeId), NodeId>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            dirty: true,
            next_hop: HashMap::new(),
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 基于邻接表重建路由表。`adj[n]` 为与 `n` 直连的邻居（无向）。
    pub fn rebuild(&mut self, adj: &[Vec<NodeId>]) {
        let n = adj.len();
        self.next_hop.clear();

        let mut dist: Vec<usize> = vec![usize::MAX; n];
        let mut q: VecDeque<usize> = VecDeque::new();

        for dst in 0..n {
            dist.fill(usize::MAX);
            q.clear();
            dist[dst] = 0;
            q.push_back(dst);

            while let Some(v) = q.pop_front() {
                for nb in &adj[v] {
                    if dist[nb.0] == usize::MAX {
                        dist[nb.0] = dist[v] + 1;
                        q.push_back(nb.0);
                    }
                }
            }

            for from in 0..n {
                if from == dst || dist[from] == usize::MAX {
                    continue;
                }
                let best = adj[from]
                    .iter()
                    .filter(|nb| dist[nb.0] + 1 == dist[from])
                    .min();
                if let Some(&nh) = best {
                    self.next_hop.insert((NodeId(from), NodeId(dst)), nh);
                }
            }
        }

        self.dirty = false;
    }

    /// `from` 去往 `dst` 的下一跳
    pub fn next_hop(&self, from: NodeId, dst: NodeId) -> Option<NodeId> {
        self.next_hop.get(&(from, dst)).copied()
    }

    /// 完整路径（含两端）；不可达时为 None
    pub fn path(&self, from: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![from];
        let mut at = from;
        while at != dst {
            at = self.next_hop(at, dst)?;
            path.push(at);
            if path.len() > self.next_hop.len() + 2 {
                return None;
            }
        }
        Some(path)
    }
}
