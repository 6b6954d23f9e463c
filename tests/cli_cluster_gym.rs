use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "clustersim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn read_json(path: &PathBuf) -> Value {
    let raw = fs::read_to_string(path).expect("read report");
    serde_json::from_str(&raw).expect("parse report")
}

#[test]
fn cluster_gym_default_run_writes_report() {
    let dir = unique_temp_dir("cluster-gym-default");
    let report = dir.join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_cluster_gym"))
        .args(["--report-json", report.to_str().unwrap()])
        .env("RUST_LOG", "warn")
        .output()
        .expect("run cluster_gym");
    assert!(
        output.status.success(),
        "cluster_gym failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.lines().any(|l| l.starts_with("summary ") && l.contains("samples=90")),
        "missing summary line: {stdout}"
    );

    let v = read_json(&report);
    assert_eq!(v["final_time"].as_u64(), Some(30_000_000_000));
    assert_eq!(v["topology"]["links"].as_u64(), Some(21));
    assert_eq!(v["topology"]["subnets"][0].as_str(), Some("10.0.1.0/24"));
    assert_eq!(v["observation_space"]["kind"].as_str(), Some("box"));
    assert_eq!(v["observation_space"]["shape"][0].as_u64(), Some(3));
    assert_eq!(v["action_space"]["kind"].as_str(), Some("discrete"));
    assert_eq!(v["action_space"]["n"].as_u64(), Some(3));

    let steps = v["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 59);
    assert_eq!(steps[0]["step"].as_u64(), Some(0));
    assert_eq!(steps[0]["reward"].as_f64(), Some(0.0));
    assert!(steps[0]["action"].is_null());
    assert_eq!(steps[58]["done"].as_bool(), Some(true));

    assert_eq!(v["latency_samples"].as_array().map(Vec::len), Some(90));
    assert_eq!(v["ticks"].as_array().map(Vec::len), Some(31));
    assert_eq!(v["stats"]["unmatched_receives"].as_u64(), Some(0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cluster_gym_scenario_file_and_monitor_dump() {
    let dir = unique_temp_dir("cluster-gym-scenario");
    let scenario = write_file(
        &dir,
        "scenario.json",
        r#"
{
    "topology": { "group_count": 2, "nodes_per_group": 2, "mobility": false },
    "traffic": { "clients": [ { "group": 1, "start_s": 1.0, "stop_s": 5.0 } ] },
    "env": { "horizon_s": 5.0 },
    "run": { "stop_s": 6.0 }
}
        "#,
    );
    let report = dir.join("report.json");
    let monitor = dir.join("monitor.txt");

    let output = Command::new(env!("CARGO_BIN_EXE_cluster_gym"))
        .args([
            "--scenario",
            scenario.to_str().unwrap(),
            "--agent",
            "cyclic",
            "--monitor-out",
            monitor.to_str().unwrap(),
            "--report-json",
            report.to_str().unwrap(),
        ])
        .env("RUST_LOG", "warn")
        .output()
        .expect("run cluster_gym");
    assert!(
        output.status.success(),
        "cluster_gym failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let v = read_json(&report);
    assert_eq!(v["topology"]["nodes"].as_u64(), Some(6));
    assert_eq!(v["topology"]["links"].as_u64(), Some(7));
    let steps = v["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 11);
    let obs: Vec<f64> = steps[0]["observation"]
        .as_array()
        .expect("observation")
        .iter()
        .filter_map(Value::as_f64)
        .collect();
    assert_eq!(obs, vec![10.0, 40.0]);
    assert_eq!(steps[1]["action"].as_u64(), Some(1));
    assert_eq!(v["latency_samples"].as_array().map(Vec::len), Some(8));
    assert_eq!(v["ticks"].as_array().map(Vec::len), Some(7));

    let dump = fs::read_to_string(&monitor).expect("read monitor dump");
    assert!(dump.starts_with("# tick 1 at 0.000000s\n"));
    assert!(dump.contains("# tick 7 at 6.000000s\n"));
    assert_eq!(
        dump.lines()
            .skip_while(|l| *l != "# tick 7 at 6.000000s")
            .filter(|l| l.starts_with("latency\t"))
            .count(),
        8
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn cluster_gym_rejects_unknown_agent() {
    let output = Command::new(env!("CARGO_BIN_EXE_cluster_gym"))
        .args(["--agent", "greedy", "--until-s", "1"])
        .env("RUST_LOG", "off")
        .output()
        .expect("run cluster_gym");
    assert!(!output.status.success());
}
