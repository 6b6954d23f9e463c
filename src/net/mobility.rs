//! 移动模型
//!
//! 头节点固定位置；成员节点在矩形边界内做二维随机游走（碰到边界反射）。
//! 随机游走的轨迹只由种子和时间决定，查询位置不会改变之后的轨迹。

use crate::sim::SimTime;
use rand::prelude::*;
use rand_pcg::Pcg64;
use serde::Serialize;
use std::f64::consts::TAU;

/// 二维坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 轴对齐矩形边界
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn contains(&self, p: Vector2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    pub fn clamp(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.y_min, self.y_max),
        )
    }
}

/// 随机游走参数：速度 U[min, max] m/s，方向 U[0, 2π)，每隔 `change_every` 重新抽取。
#[derive(Debug, Clone, Copy)]
pub struct WalkParams {
    pub speed_min: f64,
    pub speed_max: f64,
    pub change_every: SimTime,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            speed_min: 2.0,
            speed_max: 4.0,
            change_every: SimTime::from_secs(1),
        }
    }
}

/// 有界二维随机游走
#[derive(Debug, Clone)]
pub struct RandomWalk2d {
    bounds: Rect,
    params: WalkParams,
    rng: Pcg64,
    pos: Vector2,
    vel: Vector2,
    updated_at: SimTime,
    next_change: SimTime,
}

impl RandomWalk2d {
    pub fn new(start: Vector2, bounds: Rect, params: WalkParams, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let vel = draw_velocity(&mut rng, &params);
        Self {
            bounds,
            pos: bounds.clamp(start),
            vel,
            rng,
            updated_at: SimTime::ZERO,
            next_change: params.change_every,
            params,
        }
    }

    /// `t` 时刻的位置。时间只能向前推进，更早的 `t` 返回最近一次计算的位置。
    pub fn position_at(&mut self, t: SimTime) -> Vector2 {
        if t <= self.updated_at {
            return self.pos;
        }
        while self.params.change_every > SimTime::ZERO && self.next_change <= t {
            let at = self.next_change;
            self.advance_to(at);
            self.vel = draw_velocity(&mut self.rng, &self.params);
            self.next_change = at.saturating_add(self.params.change_every);
        }
        self.advance_to(t);
        self.pos
    }

    fn advance_to(&mut self, t: SimTime) {
        let dt = t.secs_since(self.updated_at);
        if dt > 0.0 {
            self.travel(dt);
        }
        self.updated_at = t;
    }

    fn travel(&mut self, mut dt: f64) {
        let b = self.bounds;
        for _ in 0..64 {
            if dt <= 0.0 {
                break;
            }
            let tx = time_to_wall(self.pos.x, self.vel.x, b.x_min, b.x_max);
            let ty = time_to_wall(self.pos.y, self.vel.y, b.y_min, b.y_max);
            let hit = tx.min(ty);
            if hit >= dt {
                self.pos.x += self.vel.x * dt;
                self.pos.y += self.vel.y * dt;
                break;
            }
            self.pos.x += self.vel.x * hit;
            self.pos.y += self.vel.y * hit;
            dt -= hit;
            if tx <= ty {
                self.vel.x = -self.vel.x;
            }
            if ty <= tx {
                self.vel.y = -self.vel.y;
            }
        }
        self.pos = b.clamp(self.pos);
    }
}

fn draw_velocity(rng: &mut Pcg64, p: &WalkParams) -> Vector2 {
    let speed = if p.speed_max > p.speed_min {
        rng.gen_range(p.speed_min..=p.speed_max)
    } else {
        p.speed_min
    };
    let dir = rng.gen_range(0.0..TAU);
    Vector2::new(speed * dir.cos(), speed * dir.sin())
}

fn time_to_wall(p: f64, v: f64, lo: f64, hi: f64) -> f64 {
    if v > 0.0 {
        ((hi - p) / v).max(0.0)
    } else if v < 0.0 {
        ((lo - p) / v).max(0.0)
    } else {
        f64::INFINITY
    }
}

/// 节点的移动模型
#[derive(Debug, Clone)]
pub enum Mobility {
    Fixed(Vector2),
    RandomWalk(RandomWalk2d),
}

impl Default for Mobility {
    fn default() -> Self {
        Mobility::Fixed(Vector2::default())
    }
}

impl Mobility {
    pub fn position_at(&mut self, t: SimTime) -> Vector2 {
        match self {
            Mobility::Fixed(p) => *p,
            Mobility::RandomWalk(walk) => walk.position_at(t),
        }
    }
}
