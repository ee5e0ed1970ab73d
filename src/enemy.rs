//! Enemy placement and the wander policy that steers them.
//!
//! Enemies never chase the player. They run straight until a step is blocked
//! by a wall, then pick a new direction at random, avoiding a U-turn whenever
//! another choice exists.

use crate::maze::{Dir, Grid, Pos, Tile};
use log::debug;
use rand::Rng;

/// Pixels per cell; speeds are expressed in pixels per second.
pub const TILE_SIZE: f32 = 32.0;
/// Enemies never spawn within this many cells of the player.
pub const SAFE_RADIUS: f32 = 4.0;
const BASE_SPEED: f32 = 40.0;
const SPEED_PER_LEVEL: f32 = 5.0;
const BASE_ENEMIES: usize = 2;
const TINTS: [Tint; 3] = [Tint::Red, Tint::Blue, Tint::Pink];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tint {
    Red,
    Blue,
    Pink,
    Rgb(u8, u8, u8),
}

/// Sides that collided during the last movement step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blocked {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Blocked {
    #[cfg(test)]
    pub(crate) fn toward(dir: Dir) -> Self {
        let mut blocked = Self::default();
        blocked.set(dir);
        blocked
    }

    pub fn set(&mut self, dir: Dir) {
        match dir {
            Dir::Up => self.up = true,
            Dir::Down => self.down = true,
            Dir::Left => self.left = true,
            Dir::Right => self.right = true,
        }
    }

    pub fn any(self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

pub fn base_speed(level: u32) -> f32 {
    BASE_SPEED + SPEED_PER_LEVEL * level as f32
}

pub fn enemy_count(level: u32) -> usize {
    BASE_ENEMIES + level as usize
}

/// Axis-aligned velocity in screen coordinates (y grows downward).
pub fn velocity(dir: Dir, speed: f32) -> (f32, f32) {
    match dir {
        Dir::Up => (0.0, -speed),
        Dir::Down => (0.0, speed),
        Dir::Left => (-speed, 0.0),
        Dir::Right => (speed, 0.0),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub pos: Pos,
    pub dir: Dir,
    pub speed: f32,
    pub velocity: (f32, f32),
    pub tint: Tint,
    pub blocked: Blocked,
    progress: f32,
}

impl Enemy {
    pub fn new(pos: Pos, level: u32, tint: Tint) -> Self {
        let speed = base_speed(level);
        Self {
            pos,
            dir: Dir::Up,
            speed,
            velocity: velocity(Dir::Up, speed),
            tint,
            blocked: Blocked::default(),
            progress: 0.0,
        }
    }

    #[cfg(test)]
    pub(crate) fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_direction(&mut self, dir: Dir) {
        self.dir = dir;
        self.velocity = velocity(dir, self.speed);
    }

    /// Picks a new heading if the last step collided. Returns whether the
    /// heading was recomputed; otherwise velocity is left untouched.
    pub fn steer(&mut self, rng: &mut impl Rng) -> bool {
        if !self.blocked.any() {
            return false;
        }
        let dir = next_direction(self.dir, rng);
        debug!(
            "enemy at ({}, {}) blocked heading {:?}, turning {:?}",
            self.pos.x, self.pos.y, self.dir, dir
        );
        self.set_direction(dir);
        self.blocked = Blocked::default();
        true
    }

    /// Moves whole cells along the current heading. Facing a wall flags the
    /// collision at once and leaves progress at zero, so the next `steer`
    /// turns without waiting out a cell of travel.
    pub fn advance(&mut self, grid: &Grid, dt_secs: f32) {
        let Some(mut next) = self.step_target(grid) else {
            self.halt();
            return;
        };
        self.progress += self.speed * dt_secs / TILE_SIZE;
        while self.progress >= 1.0 {
            self.pos = next;
            self.progress -= 1.0;
            match self.step_target(grid) {
                Some(cell) => next = cell,
                None => {
                    self.halt();
                    break;
                }
            }
        }
    }

    fn step_target(&self, grid: &Grid) -> Option<Pos> {
        grid.neighbor(self.pos, self.dir).filter(|n| !grid.is_wall(*n))
    }

    fn halt(&mut self) {
        self.blocked.set(self.dir);
        self.progress = 0.0;
    }
}

/// Uniform pick among `options`, skipping the reverse of `current` unless it
/// is the only option left.
pub fn choose_direction(options: &[Dir], current: Dir, rng: &mut impl Rng) -> Option<Dir> {
    let reverse = current.reverse();
    let forward: Vec<Dir> = options.iter().copied().filter(|&d| d != reverse).collect();
    let pool: &[Dir] = if forward.is_empty() { options } else { &forward };
    if pool.is_empty() {
        return None;
    }
    Some(pool[rng.gen_range(0..pool.len())])
}

pub fn next_direction(current: Dir, rng: &mut impl Rng) -> Dir {
    choose_direction(&Dir::ALL, current, rng).unwrap_or(current)
}

/// Spawns up to `count` enemies on distinct cells more than
/// [`SAFE_RADIUS`] cells from `player`. Fewer come back when the candidate
/// pool runs dry.
pub fn place_enemies(
    grid: &Grid,
    player: Pos,
    count: usize,
    level: u32,
    rng: &mut impl Rng,
) -> Vec<Enemy> {
    let mut candidates: Vec<Pos> = grid
        .cells()
        .filter(|&(pos, tile)| {
            matches!(tile, Tile::Open | Tile::PowerSpawn) && pos.distance(player) > SAFE_RADIUS
        })
        .map(|(pos, _)| pos)
        .collect();

    let mut enemies = Vec::with_capacity(count.min(candidates.len()));
    for i in 0..count {
        if candidates.is_empty() {
            break;
        }
        let pos = candidates.remove(rng.gen_range(0..candidates.len()));
        let tint = match TINTS.get(i) {
            Some(&tint) => tint,
            None => Tint::Rgb(
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
                rng.gen_range(100..=255),
            ),
        };
        enemies.push(Enemy::new(pos, level, tint));
    }
    enemies
}
