//! Scenario runner.
//!
//! Wires a [`ScenarioSpec`] into a simulator and a [`NetWorld`]: topology, echo
//! servers and clients, latency sinks, the periodic monitor and the environment
//! bridge. [`run_scenario`] then drives the clock to the stop time.

use crate::app::echo::{EchoClient, EchoServer};
use crate::gym::{
    Agent, ClusterEnv, CyclicAgent, EnvBridge, EnvStep, EventLog, IdleAgent, PeriodicMonitor,
    SendSchedule,
};
use crate::net::{NetWorld, NodeId};
use crate::report::RunReport;
use crate::sim::{AgentKind, Periodic, ScenarioError, ScenarioSpec, SimTime, Simulator};
use crate::topo::cluster::{ClusterOpts, ClusterTopology, build_cluster};
use std::io::Write;
use tracing::{debug, info};

/// Outputs that live outside the scenario document.
#[derive(Default)]
pub struct RunOptions {
    /// Destination of the monitor's per-tick dump.
    pub monitor_out: Option<Box<dyn Write + Send>>,
}

/// A fully wired run, ready to be stepped.
pub struct Run {
    pub sim: Simulator,
    pub world: NetWorld,
    pub topology: ClusterTopology,
    pub stop_at: SimTime,
}

impl Run {
    pub fn run_to_end(mut self) -> RunReport {
        info!(stop_at = %self.stop_at, "▶️  开始运行场景");
        self.sim.run_until(self.stop_at, &mut self.world);
        let report = RunReport::collect(self.sim.now(), &self.world, &self.topology);
        info!(
            sent = report.stats.sent_pkts,
            received = report.stats.received_pkts,
            samples = report.latency_samples.len(),
            mean_latency_s = ?report.mean_latency_s,
            "✅ 场景运行完成"
        );
        report
    }
}

fn agent_for(kind: AgentKind) -> Box<dyn Agent> {
    match kind {
        AgentKind::Idle => Box::new(IdleAgent),
        AgentKind::Cyclic => Box::new(CyclicAgent::default()),
    }
}

/// Builds everything described by `spec` without advancing the clock.
pub fn setup(spec: &ScenarioSpec, opts: RunOptions) -> Result<Run, ScenarioError> {
    spec.validate()?;

    let schedule = match &spec.env.shared_schedule_s {
        Some(times) => SendSchedule::shared_secs(times),
        None => SendSchedule::PerNode,
    };
    let mut sim = Simulator::default();
    let mut world = NetWorld::with_log(EventLog::new(schedule));
    let topology = build_cluster(&mut world, &ClusterOpts::from_spec(&spec.topology))?;

    let traffic = &spec.traffic;
    let servers = &topology.groups[traffic.server_group].members;
    let server_stop = SimTime::from_secs_f64(traffic.server_stop_s);
    for &server in servers {
        world.net.node_mut(server).set_echo_server(EchoServer {
            port: traffic.port,
            stop_at: server_stop,
        });
        world.log.watch(server);
    }

    let mut flow_id = 1;
    for wave in &traffic.clients {
        for (k, &client) in topology.groups[wave.group].members.iter().enumerate() {
            let target_idx = k % servers.len();
            let target = topology
                .member_address(&world.net, traffic.server_group, target_idx)
                .ok_or_else(|| ScenarioError::Invalid {
                    reason: format!("server member {target_idx} has no spoke address"),
                })?;
            debug!(client = client.0, %target, start_s = wave.start_s, "安装回显客户端");
            EchoClient {
                flow_id,
                node: client,
                target,
                port: traffic.port,
                packet_bytes: traffic.packet_bytes,
                remaining: traffic.max_packets,
                interval: SimTime::from_secs_f64(traffic.interval_s),
                stop_at: SimTime::from_secs_f64(wave.stop_s),
            }
            .start(&mut sim, SimTime::from_secs_f64(wave.start_s));
            flow_id += 1;
        }
    }

    if spec.monitor.enabled {
        Periodic::new(
            PeriodicMonitor::new(opts.monitor_out),
            SimTime::from_secs_f64(spec.monitor.tick_s),
        )
        .start(&mut sim, SimTime::ZERO);
    }

    let monitored: Vec<NodeId> = match &spec.env.monitored {
        Some(ids) => ids.iter().map(|&i| NodeId(i)).collect(),
        None => topology.groups.iter().map(|g| g.members[0]).collect(),
    };
    if let Some(bad) = monitored.iter().find(|n| n.0 >= world.net.node_count()) {
        return Err(ScenarioError::Invalid {
            reason: format!("monitored node {} does not exist", bad.0),
        });
    }
    let env = ClusterEnv::new(
        monitored,
        spec.env.obs_low,
        spec.env.obs_high,
        SimTime::from_secs_f64(spec.env.horizon_s),
    );
    world.bridge = Some(EnvBridge::new(Box::new(env), agent_for(spec.env.agent)));
    Periodic::new(EnvStep, SimTime::from_secs_f64(spec.env.step_s)).start(&mut sim, SimTime::ZERO);

    Ok(Run {
        sim,
        world,
        topology,
        stop_at: SimTime::from_secs_f64(spec.run.stop_s),
    })
}

/// Builds and runs `spec` to its stop time.
pub fn run_scenario(spec: &ScenarioSpec, opts: RunOptions) -> Result<RunReport, ScenarioError> {
    Ok(setup(spec, opts)?.run_to_end())
}
