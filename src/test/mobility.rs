use crate::net::{Mobility, RandomWalk2d, Rect, Vector2, WalkParams};
use crate::sim::SimTime;

fn column() -> Rect {
    Rect {
        x_min: 0.0,
        x_max: 30.0,
        y_min: -100.0,
        y_max: 100.0,
    }
}

#[test]
fn random_walk_is_reproducible_for_a_seed() {
    let mut a = RandomWalk2d::new(Vector2::new(15.0, 0.0), column(), WalkParams::default(), 42);
    let mut b = RandomWalk2d::new(Vector2::new(15.0, 0.0), column(), WalkParams::default(), 42);
    let mut c = RandomWalk2d::new(Vector2::new(15.0, 0.0), column(), WalkParams::default(), 43);

    let mut differs = false;
    for step in 1..=40 {
        let t = SimTime::from_millis(step * 500);
        let pa = a.position_at(t);
        assert_eq!(pa, b.position_at(t));
        differs |= pa != c.position_at(t);
    }
    assert!(differs);
}

#[test]
fn random_walk_moves_at_the_drawn_speed() {
    let start = Vector2::new(15.0, 0.0);
    let mut walk = RandomWalk2d::new(start, column(), WalkParams::default(), 7);
    let p = walk.position_at(SimTime::from_secs(1));
    let dist = ((p.x - start.x).powi(2) + (p.y - start.y).powi(2)).sqrt();
    assert!((2.0 - 1e-9..=4.0 + 1e-9).contains(&dist), "dist={dist}");
}

#[test]
fn random_walk_stays_inside_bounds() {
    let bounds = Rect {
        x_min: 0.0,
        x_max: 3.0,
        y_min: 0.0,
        y_max: 3.0,
    };
    let mut walk = RandomWalk2d::new(Vector2::new(1.5, 1.5), bounds, WalkParams::default(), 9);
    for step in 0..=400 {
        let p = walk.position_at(SimTime::from_millis(step * 100));
        assert!(bounds.contains(p), "{p:?} escaped {bounds:?}");
    }
}

#[test]
fn random_walk_does_not_move_backwards_in_time() {
    let mut walk = RandomWalk2d::new(Vector2::new(15.0, 0.0), column(), WalkParams::default(), 3);
    let later = walk.position_at(SimTime::from_secs(5));
    assert_eq!(walk.position_at(SimTime::from_secs(2)), later);
}

#[test]
fn fixed_mobility_never_moves() {
    let mut m = Mobility::Fixed(Vector2::new(40.0, 15.0));
    assert_eq!(m.position_at(SimTime::ZERO), Vector2::new(40.0, 15.0));
    assert_eq!(m.position_at(SimTime::from_secs(100)), Vector2::new(40.0, 15.0));
}
