use crate::gym::{MonitorState, PeriodicMonitor};
use crate::net::{NetWorld, NodeId};
use crate::sim::{Periodic, PeriodicTask, SimTime, Simulator, TaskControl};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().expect("buf lock").clone()).expect("utf8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buf lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn monitor_ticks_every_second_from_zero_and_dumps_the_log() {
    let buf = SharedBuf::default();
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    world.log.on_send(NodeId(4), SimTime::from_secs(1));

    Periodic::new(
        PeriodicMonitor::new(Some(Box::new(buf.clone()))),
        SimTime::from_secs(1),
    )
    .start(&mut sim, SimTime::ZERO);
    sim.run_until(SimTime::from_secs(3), &mut world);

    let times: Vec<_> = world.ticks.iter().map(|t| t.time).collect();
    assert_eq!(
        times,
        vec![
            SimTime::ZERO,
            SimTime::from_secs(1),
            SimTime::from_secs(2),
            SimTime::from_secs(3)
        ]
    );
    assert!(world.ticks.iter().all(|t| t.send_records == 1));
    assert!(world.ticks.iter().all(|t| t.mean_latency_s.is_none()));

    let text = buf.text();
    assert!(text.starts_with("# tick 1 at 0.000000s\nsend\t4\t1.000000s\n"));
    assert!(text.contains("# tick 4 at 3.000000s\n"));
    assert_eq!(text.matches("send\t4\t").count(), 4);
}

#[test]
fn monitor_moves_from_idle_to_running() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let mut monitor = PeriodicMonitor::new(None);
    assert_eq!(monitor.state(), MonitorState::Idle);

    assert_eq!(monitor.run_once(&mut sim, &mut world), TaskControl::Continue);
    assert_eq!(monitor.state(), MonitorState::Running { ticks: 1 });
    assert_eq!(monitor.run_once(&mut sim, &mut world), TaskControl::Continue);
    assert_eq!(monitor.state(), MonitorState::Running { ticks: 2 });
    assert_eq!(world.ticks.len(), 2);
}

#[test]
fn monitor_survives_a_failing_writer() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let mut monitor = PeriodicMonitor::new(Some(Box::new(Broken)));

    for _ in 0..3 {
        assert_eq!(monitor.run_once(&mut sim, &mut world), TaskControl::Continue);
    }
    assert_eq!(world.ticks.len(), 3);
}
