use clap::Parser;
use clustersim::gym::TWO_WAVE_SEND_TIMES_S;
use clustersim::runner::{RunOptions, run_scenario};
use clustersim::sim::{AgentKind, ScenarioError, ScenarioSpec};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "cluster-gym",
    about = "Run the clustered echo scenario and expose latency as a stepped environment"
)]
struct Args {
    /// Path to scenario.json; defaults to the built-in 3x3 scenario
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override number of groups
    #[arg(long)]
    groups: Option<usize>,

    /// Override number of members per group
    #[arg(long)]
    nodes_per_group: Option<usize>,

    /// Stop the clock at this time (seconds)
    #[arg(long)]
    until_s: Option<f64>,

    /// Override environment step interval (ms)
    #[arg(long)]
    env_step_ms: Option<u64>,

    /// Controller driving the environment steps
    #[arg(long, value_enum)]
    agent: Option<AgentKind>,

    /// Match receives against the fixed two-wave send schedule instead of per-node queues
    #[arg(long)]
    shared_schedule: bool,

    /// Write the monitor's per-tick send/receive/latency dump here
    #[arg(long)]
    monitor_out: Option<PathBuf>,

    /// Write the run report as JSON here
    #[arg(long)]
    report_json: Option<PathBuf>,
}

fn main() -> Result<(), ScenarioError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    let mut spec = match &args.scenario {
        Some(path) => ScenarioSpec::from_path(path)?,
        None => ScenarioSpec::default(),
    };

    if let Some(g) = args.groups {
        spec.topology.group_count = g;
    }
    if let Some(n) = args.nodes_per_group {
        spec.topology.nodes_per_group = n;
    }
    if let Some(s) = args.until_s {
        spec.run.stop_s = s;
    }
    if let Some(ms) = args.env_step_ms {
        spec.env.step_s = ms as f64 / 1e3;
    }
    if let Some(agent) = args.agent {
        spec.env.agent = agent;
    }
    if args.shared_schedule {
        spec.env.shared_schedule_s = Some(TWO_WAVE_SEND_TIMES_S.to_vec());
    }

    let monitor_out = match &args.monitor_out {
        Some(path) => Some(Box::new(BufWriter::new(File::create(path)?)) as Box<dyn Write + Send>),
        None => None,
    };

    let report = run_scenario(&spec, RunOptions { monitor_out })?;

    println!(
        "summary final_time={} steps={} samples={} mean_latency_s={} sent={} received={} unmatched={}",
        report.final_time,
        report.steps.len(),
        report.latency_samples.len(),
        report
            .mean_latency_s
            .map(|v| format!("{v:.6}"))
            .unwrap_or_else(|| "n/a".to_string()),
        report.stats.sent_pkts,
        report.stats.received_pkts,
        report.stats.unmatched_receives,
    );

    if let Some(path) = &args.report_json {
        let raw = serde_json::to_string_pretty(&report)?;
        fs::write(path, raw)?;
        info!(path = %path.display(), "📝 运行报告已写出");
    }
    Ok(())
}
