//! Scenario configuration.
//!
//! A scenario is a JSON document describing the topology, the echo traffic, the
//! environment bridge, the periodic monitor and the run horizon. Every field has
//! a default, so `{}` is a valid scenario reproducing the 3x3 cluster experiment.

use crate::topo::cluster::BuildError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid topology: {0}")]
    Build(#[from] BuildError),
    #[error("invalid scenario: {reason}")]
    Invalid { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioSpec {
    pub topology: TopologySpec,
    pub traffic: TrafficSpec,
    pub env: EnvSpec,
    pub monitor: MonitorSpec,
    pub run: RunSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySpec {
    pub group_count: usize,
    pub nodes_per_group: usize,
    pub data_rate_bps: u64,
    pub delay_ms: f64,
    /// First two octets of every subnet base address.
    pub subnet_prefix: [u8; 2],
    pub subnet_mask: Ipv4Addr,
    pub seed: u64,
    /// When false, members keep their initial grid position.
    pub mobility: bool,
}

impl Default for TopologySpec {
    fn default() -> Self {
        Self {
            group_count: 3,
            nodes_per_group: 3,
            data_rate_bps: 5_000_000,
            delay_ms: 2.0,
            subnet_prefix: [10, 0],
            subnet_mask: Ipv4Addr::new(255, 255, 255, 0),
            seed: 1,
            mobility: true,
        }
    }
}

/// A wave of echo clients: every member of `group` runs one client between
/// `start_s` and `stop_s`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoClientSpec {
    pub group: usize,
    pub start_s: f64,
    pub stop_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficSpec {
    /// Echo servers (and latency sinks) run on every member of this group.
    pub server_group: usize,
    pub port: u16,
    pub max_packets: u64,
    pub interval_s: f64,
    pub packet_bytes: u32,
    pub server_stop_s: f64,
    /// Client `k` of a wave targets member `k % nodes_per_group` of `server_group`.
    pub clients: Vec<EchoClientSpec>,
}

impl Default for TrafficSpec {
    fn default() -> Self {
        Self {
            server_group: 0,
            port: 9,
            max_packets: 15,
            interval_s: 1.0,
            packet_bytes: 1024,
            server_stop_s: 30.0,
            clients: vec![
                EchoClientSpec {
                    group: 1,
                    start_s: 5.0,
                    stop_s: 20.0,
                },
                EchoClientSpec {
                    group: 2,
                    start_s: 10.0,
                    stop_s: 25.0,
                },
            ],
        }
    }
}

/// Controller driving the environment bridge; also accepted as a CLI value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Idle,
    Cyclic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvSpec {
    pub step_s: f64,
    pub horizon_s: f64,
    pub obs_low: f64,
    pub obs_high: f64,
    /// Node ids to observe; defaults to the first member of every group.
    pub monitored: Option<Vec<usize>>,
    pub agent: AgentKind,
    /// Fixed send-time schedule shared by every sink (seconds). When absent the
    /// send path feeds a per-node queue instead.
    pub shared_schedule_s: Option<Vec<f64>>,
}

impl Default for EnvSpec {
    fn default() -> Self {
        Self {
            step_s: 0.5,
            horizon_s: 29.0,
            obs_low: 0.0,
            obs_high: 100.0,
            monitored: None,
            agent: AgentKind::Idle,
            shared_schedule_s: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSpec {
    pub enabled: bool,
    pub tick_s: f64,
}

impl Default for MonitorSpec {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_s: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSpec {
    pub stop_s: f64,
}

impl Default for RunSpec {
    fn default() -> Self {
        Self { stop_s: 30.0 }
    }
}

impl ScenarioSpec {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Checks the cross-field constraints that serde cannot express. Topology
    /// sizes are validated by the builder itself.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |reason: String| Err(ScenarioError::Invalid { reason });
        let groups = self.topology.group_count;
        if self.traffic.server_group >= groups && groups > 0 {
            return invalid(format!(
                "server_group {} out of range for {} groups",
                self.traffic.server_group, groups
            ));
        }
        for wave in &self.traffic.clients {
            if wave.group >= groups && groups > 0 {
                return invalid(format!("client group {} out of range", wave.group));
            }
            if wave.stop_s < wave.start_s {
                return invalid(format!(
                    "client group {} stops ({}) before it starts ({})",
                    wave.group, wave.stop_s, wave.start_s
                ));
            }
        }
        if !(self.traffic.interval_s > 0.0) {
            return invalid("traffic.interval_s must be positive".into());
        }
        if !(self.env.step_s > 0.0) {
            return invalid("env.step_s must be positive".into());
        }
        if self.monitor.enabled && !(self.monitor.tick_s > 0.0) {
            return invalid("monitor.tick_s must be positive".into());
        }
        if self.env.obs_high < self.env.obs_low {
            return invalid("env.obs_high must not be below env.obs_low".into());
        }
        if let Some(monitored) = &self.env.monitored {
            if monitored.is_empty() {
                return invalid("env.monitored must not be empty".into());
            }
        }
        Ok(())
    }
}
