use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_millis(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn sim_time_from_float_seconds_rounds_and_floors_at_zero() {
    assert_eq!(SimTime::from_secs_f64(0.5), SimTime(500_000_000));
    assert_eq!(SimTime::from_secs_f64(5.2), SimTime(5_200_000_000));
    assert_eq!(SimTime::from_secs_f64(-1.0), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::ZERO);
    assert_eq!(SimTime::from_secs_f64(1e30), SimTime::MAX);
}

#[test]
fn sim_time_signed_difference_and_display() {
    let a = SimTime::from_millis(5_200);
    let b = SimTime::from_secs(5);
    assert!((a.secs_since(b) - 0.2).abs() < 1e-12);
    assert!((b.secs_since(a) + 0.2).abs() < 1e-12);
    assert_eq!(SimTime::from_millis(1_500).to_string(), "1.500000s");
    assert_eq!(SimTime::MAX + SimTime(1), SimTime::MAX);
}
