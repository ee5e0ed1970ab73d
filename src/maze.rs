//! Procedural maze generation.
//!
//! Passages are carved with a randomized depth-first walk over the
//! odd-coordinate lattice, then a post-processing pass opens extra
//! connections so the maze has loops instead of a single solution path.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

pub const DEFAULT_GRID_W: usize = 15;
pub const DEFAULT_GRID_H: usize = 17;
const MIN_GRID: usize = 5;
const EXTRA_PASSAGES_BASE: u32 = 5;
const EXTRA_PASSAGES_PER_LEVEL: u32 = 2;
const CARVE_STEPS: [(isize, isize); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Open,
    PowerSpawn,
    PlayerSpawn,
}

impl Tile {
    pub fn is_passable(self) -> bool {
        self != Tile::Wall
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in cells.
    pub fn distance(self, other: Pos) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn reverse(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Which extra-connection rule runs after the depth-first carve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostProcess {
    /// Open one random wall around every cell that has three or more.
    #[default]
    BreakDeadEnds,
    /// Open `5 + 2 * level` random interior cells.
    ExtraPassages,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    pub post_process: PostProcess,
}

impl MazeConfig {
    /// Dimensions are rounded down to odd values of at least 5 so the carve
    /// lattice reaches the rows and columns next to the border.
    pub fn new(width: usize, height: usize, post_process: PostProcess) -> Self {
        Self {
            width: normalize_dim(width),
            height: normalize_dim(height),
            post_process,
        }
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_W, DEFAULT_GRID_H, PostProcess::default())
    }
}

fn normalize_dim(n: usize) -> usize {
    let n = n.max(MIN_GRID);
    if n % 2 == 0 {
        n - 1
    } else {
        n
    }
}

pub fn player_spawn_position(width: usize, height: usize) -> Pos {
    Pos::new(width / 2, height - 2)
}

pub fn power_spawn_positions(width: usize, height: usize) -> [Pos; 4] {
    [
        Pos::new(1, 1),
        Pos::new(width - 2, 1),
        Pos::new(1, height - 2),
        Pos::new(width - 2, height - 2),
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    rows: Vec<Vec<Tile>>,
    player_spawn: Pos,
}

impl Grid {
    fn filled(width: usize, height: usize, tile: Tile) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![tile; width]; height],
            player_spawn: player_spawn_position(width, height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player_spawn(&self) -> Pos {
        self.player_spawn
    }

    pub fn tile(&self, pos: Pos) -> Tile {
        self.rows[pos.y][pos.x]
    }

    fn set(&mut self, pos: Pos, tile: Tile) {
        self.rows[pos.y][pos.x] = tile;
    }

    pub fn is_wall(&self, pos: Pos) -> bool {
        self.tile(pos) == Tile::Wall
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1
    }

    /// The adjacent cell in `dir`, if it lies on the grid.
    pub fn neighbor(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        self.offset(pos, dx, dy)
    }

    fn offset(&self, pos: Pos, dx: isize, dy: isize) -> Option<Pos> {
        let nx = pos.x as isize + dx;
        let ny = pos.y as isize + dy;
        if nx < 0 || ny < 0 || nx >= self.width as isize || ny >= self.height as isize {
            return None;
        }
        Some(Pos::new(nx as usize, ny as usize))
    }

    fn interior_offset(&self, pos: Pos, dx: isize, dy: isize) -> Option<Pos> {
        self.offset(pos, dx, dy).filter(|p| !self.is_border(*p))
    }

    /// True when the cell in `dir` exists and is not a wall.
    pub fn can_enter(&self, pos: Pos, dir: Dir) -> bool {
        match self.neighbor(pos, dir) {
            Some(next) => !self.is_wall(next),
            None => false,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (Pos, Tile)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &tile)| (Pos::new(x, y), tile))
        })
    }

    pub fn count(&self, tile: Tile) -> usize {
        self.cells().filter(|&(_, t)| t == tile).count()
    }

    /// Flood fill over non-wall cells, indexed `[y][x]`.
    pub fn reachable_from(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.width]; self.height];
        if self.is_wall(start) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[start.y][start.x] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                if let Some(next) = self.neighbor(pos, dir) {
                    if seen[next.y][next.x] || self.is_wall(next) {
                        continue;
                    }
                    seen[next.y][next.x] = true;
                    q.push_back(next);
                }
            }
        }
        seen
    }

    #[cfg(test)]
    pub(crate) fn from_ascii(rows: &[&str]) -> Grid {
        let height = rows.len();
        let width = rows[0].len();
        let mut grid = Grid::filled(width, height, Tile::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => Tile::Open,
                    'o' => Tile::PowerSpawn,
                    'P' => Tile::PlayerSpawn,
                    _ => Tile::Wall,
                };
                if tile == Tile::PlayerSpawn {
                    grid.player_spawn = Pos::new(x, y);
                }
                grid.set(Pos::new(x, y), tile);
            }
        }
        grid
    }
}

/// Generates the maze for `level` with the default 15x17 layout.
pub fn generate(level: u32, rng: &mut impl Rng) -> Grid {
    generate_with(&MazeConfig::default(), level, rng)
}

pub fn generate_with(config: &MazeConfig, level: u32, rng: &mut impl Rng) -> Grid {
    let width = normalize_dim(config.width);
    let height = normalize_dim(config.height);
    let mut grid = Grid::filled(width, height, Tile::Wall);

    carve_passages(&mut grid, rng);
    match config.post_process {
        PostProcess::BreakDeadEnds => break_dead_ends(&mut grid, rng),
        PostProcess::ExtraPassages => carve_extra_passages(&mut grid, level, rng),
    }
    place_spawns(&mut grid);
    grid
}

fn carve_passages(grid: &mut Grid, rng: &mut impl Rng) {
    let start = Pos::new(1, 1);
    grid.set(start, Tile::Open);
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let neighbors: Vec<Pos> = CARVE_STEPS
            .iter()
            .filter_map(|&(dx, dy)| grid.interior_offset(current, dx, dy))
            .filter(|&p| grid.is_wall(p))
            .collect();

        match neighbors.choose(rng) {
            Some(&next) => {
                let between = Pos::new((current.x + next.x) / 2, (current.y + next.y) / 2);
                grid.set(next, Tile::Open);
                grid.set(between, Tile::Open);
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
}

fn break_dead_ends(grid: &mut Grid, rng: &mut impl Rng) {
    for y in 1..grid.height - 1 {
        for x in 1..grid.width - 1 {
            let pos = Pos::new(x, y);
            if grid.tile(pos) != Tile::Open {
                continue;
            }
            let walls: Vec<Pos> = Dir::ALL
                .iter()
                .filter_map(|&dir| grid.neighbor(pos, dir))
                .filter(|&n| grid.is_wall(n))
                .collect();
            if walls.len() < 3 {
                continue;
            }
            if let Some(&target) = walls.choose(rng) {
                // The border stays intact even when it was the wall picked.
                if !grid.is_border(target) {
                    grid.set(target, Tile::Open);
                }
            }
        }
    }
}

fn carve_extra_passages(grid: &mut Grid, level: u32, rng: &mut impl Rng) {
    let passages =
        EXTRA_PASSAGES_BASE.saturating_add(level.saturating_mul(EXTRA_PASSAGES_PER_LEVEL));
    for _ in 0..passages {
        let pos = Pos::new(
            rng.gen_range(1..grid.width - 1),
            rng.gen_range(1..grid.height - 1),
        );
        let joins_maze = Dir::ALL
            .iter()
            .filter_map(|&dir| grid.neighbor(pos, dir))
            .any(|n| !grid.is_wall(n));
        if joins_maze {
            grid.set(pos, Tile::Open);
        }
    }
}

fn place_spawns(grid: &mut Grid) {
    let spawn = player_spawn_position(grid.width, grid.height);
    grid.set(spawn, Tile::PlayerSpawn);
    grid.player_spawn = spawn;
    for pos in power_spawn_positions(grid.width, grid.height) {
        grid.set(pos, Tile::PowerSpawn);
    }
}
