//! 运行报告
//!
//! 一次运行结束后汇总成可序列化的报告，供 CLI 写成 JSON。

use crate::gym::{LatencySample, Space, StepRecord, TickSample};
use crate::net::{NetWorld, Stats};
use crate::sim::SimTime;
use crate::topo::cluster::ClusterTopology;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TopologySummary {
    pub groups: usize,
    pub nodes: usize,
    pub links: usize,
    pub mesh_links: usize,
    pub backbone_links: usize,
    pub spoke_links: usize,
    /// 按接线顺序列出的子网，例如 `10.0.1.0/24`
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub final_time: SimTime,
    pub topology: TopologySummary,
    pub observation_space: Option<Space>,
    pub action_space: Option<Space>,
    pub steps: Vec<StepRecord>,
    pub latency_samples: Vec<LatencySample>,
    pub mean_latency_s: Option<f64>,
    pub ticks: Vec<TickSample>,
    pub stats: Stats,
}

impl RunReport {
    pub fn collect(now: SimTime, world: &NetWorld, topo: &ClusterTopology) -> Self {
        let subnets = topo
            .links()
            .filter_map(|l| world.net.link(l).subnet)
            .map(|s| s.to_string())
            .collect();
        let topology = TopologySummary {
            groups: topo.groups.len(),
            nodes: world.net.node_count(),
            links: topo.link_count(),
            mesh_links: topo.mesh_links.len(),
            backbone_links: topo.backbone_links.len(),
            spoke_links: topo.spoke_links.iter().map(Vec::len).sum(),
            subnets,
        };
        let bridge = world.bridge.as_ref();
        Self {
            final_time: now,
            topology,
            observation_space: bridge.and_then(|b| b.observation_space().cloned()),
            action_space: bridge.and_then(|b| b.action_space().cloned()),
            steps: bridge.map(|b| b.records().to_vec()).unwrap_or_default(),
            latency_samples: world.log.all_samples().to_vec(),
            mean_latency_s: world.log.mean_latency_secs(),
            ticks: world.ticks.clone(),
            stats: world.net.stats.clone(),
        }
    }
}
