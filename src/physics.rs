//! Player motion and collision against the static obstacle grid.
//!
//! Kept free of ECS types so a whole run can be stepped in tests. Units are
//! world pixels with y pointing up, velocities in pixels per second.

use bevy::math::Vec2;
use level_format::Tile;

// Boxes must interpenetrate by more than this to count as overlapping.
const CONTACT_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, half: size / 2.0 }
    }

    pub fn left(&self) -> f32 { self.center.x - self.half.x }
    pub fn top(&self) -> f32 { self.center.y + self.half.y }
    pub fn bottom(&self) -> f32 { self.center.y - self.half.y }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let pen_x = self.half.x + other.half.x - (self.center.x - other.center.x).abs();
        let pen_y = self.half.y + other.half.y - (self.center.y - other.center.y).abs();
        pen_x > CONTACT_EPSILON && pen_y > CONTACT_EPSILON
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    pub run_speed: f32,
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub orb_velocity: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    /// Jump requested; stays set until the body lands.
    pub jump_queued: bool,
    /// Jump input held during this step.
    pub jump_pressed: bool,
    pub won: bool,
    pub died: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size, ..Default::default() }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    pub jumped: bool,
    pub landed: bool,
    pub bonked: bool,
    /// Center of the orb that fired this step.
    pub orb: Option<Vec2>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    Died,
}

pub fn outcome(body: &Body) -> Outcome {
    if body.died {
        Outcome::Died
    } else if body.won {
        Outcome::Won
    } else {
        Outcome::Playing
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Advance the body one tick: jump, gravity, then the horizontal and
/// vertical passes, each followed by collision resolution.
pub fn step(
    body: &mut Body,
    obstacles: &[(Aabb, Tile)],
    tuning: &Tuning,
    jump_power: f32,
    dt: f32,
) -> StepReport {
    let mut report = StepReport::default();

    if body.jump_queued && body.on_ground {
        body.vel.y = jump_power;
        report.jumped = true;
    } else {
        body.vel.y = (body.vel.y - tuning.gravity * dt).max(-tuning.max_fall_speed);
    }

    body.vel.x = tuning.run_speed;
    body.pos.x += body.vel.x * dt;
    resolve(body, obstacles, tuning, Axis::Horizontal, &mut report);

    body.pos.y += body.vel.y * dt;
    body.on_ground = false;
    resolve(body, obstacles, tuning, Axis::Vertical, &mut report);

    report
}

fn resolve(
    body: &mut Body,
    obstacles: &[(Aabb, Tile)],
    tuning: &Tuning,
    axis: Axis,
    report: &mut StepReport,
) {
    let half = body.size / 2.0;
    for (rect, tile) in obstacles {
        if !body.aabb().overlaps(rect) {
            continue;
        }
        match tile {
            Tile::Orb => {
                if body.jump_pressed && report.orb.is_none() {
                    body.vel.y = tuning.orb_velocity;
                    report.orb = Some(rect.center);
                }
            }
            Tile::End => body.won = true,
            Tile::Spike => body.died = true,
            Tile::Platform => {
                if axis == Axis::Vertical && body.vel.y < 0.0 {
                    body.pos.y = rect.top() + half.y;
                    body.vel.y = 0.0;
                    body.on_ground = true;
                    body.jump_queued = false;
                    report.landed = true;
                } else if axis == Axis::Vertical && body.vel.y > 0.0 {
                    body.pos.y = rect.bottom() - half.y;
                    body.vel.y = 0.0;
                    report.bonked = true;
                } else {
                    // ran into the side of a block
                    body.vel.x = 0.0;
                    body.pos.x = rect.left() - half.x;
                    body.died = true;
                }
            }
            Tile::Empty => {}
        }
    }
}
