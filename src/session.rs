//! Simulation state for one level and the phase machine around it.
//!
//! Everything here is plain data advanced by `tick`; drawing reads it through
//! the accessors and never mutates it.

use crate::enemy::{enemy_count, place_enemies, Enemy, TILE_SIZE};
use crate::maze::{generate_with, Dir, Grid, MazeConfig, Pos, Tile};
use log::info;
use rand::Rng;

/// Pixels per second.
pub const PLAYER_SPEED: f32 = 160.0;
pub const DOT_SCORE: u64 = 10;
pub const POWER_SCORE: u64 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pickup {
    None,
    Dot,
    Power,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: Pos,
    pub dir: Option<Dir>,
    /// A requested turn waiting for an opening.
    pub queued: Option<Dir>,
    progress: f32,
}

impl Player {
    fn new(pos: Pos) -> Self {
        Self {
            pos,
            dir: None,
            queued: None,
            progress: 0.0,
        }
    }

    fn apply_input(&mut self, grid: &Grid, desired: Option<Dir>) {
        if desired.is_some() {
            self.queued = desired;
        }
        if let Some(dir) = self.queued {
            if grid.can_enter(self.pos, dir) {
                self.dir = Some(dir);
                self.queued = None;
            }
        }
    }

    /// Returns every cell entered this tick.
    fn advance(&mut self, grid: &Grid, dt_secs: f32) -> Vec<Pos> {
        let mut entered = Vec::new();
        if let Some(dir) = self.dir {
            self.progress += PLAYER_SPEED * dt_secs / TILE_SIZE;
            while self.progress >= 1.0 {
                match grid.neighbor(self.pos, dir).filter(|n| !grid.is_wall(*n)) {
                    Some(next) => {
                        self.pos = next;
                        self.progress -= 1.0;
                        entered.push(next);
                    }
                    None => {
                        self.dir = None;
                        self.progress = 0.0;
                        break;
                    }
                }
            }
        }
        entered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Cleared,
    Caught,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub level: u32,
    pub score: u64,
    pub grid: Grid,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pickups: Vec<Vec<Pickup>>,
    dots_left: usize,
    power_left: usize,
}

impl Session {
    pub fn new(grid: Grid, level: u32, score: u64, rng: &mut impl Rng) -> Self {
        let enemies = place_enemies(&grid, grid.player_spawn(), enemy_count(level), level, rng);
        Self::with_enemies(grid, level, score, enemies)
    }

    pub fn with_enemies(grid: Grid, level: u32, score: u64, enemies: Vec<Enemy>) -> Self {
        let mut pickups = vec![vec![Pickup::None; grid.width()]; grid.height()];
        let mut dots_left = 0;
        let mut power_left = 0;
        for (pos, tile) in grid.cells() {
            pickups[pos.y][pos.x] = match tile {
                Tile::Open => {
                    dots_left += 1;
                    Pickup::Dot
                }
                Tile::PowerSpawn => {
                    power_left += 1;
                    Pickup::Power
                }
                Tile::Wall | Tile::PlayerSpawn => Pickup::None,
            };
        }
        Self {
            level,
            score,
            player: Player::new(grid.player_spawn()),
            grid,
            enemies,
            pickups,
            dots_left,
            power_left,
        }
    }

    pub fn pickup(&self, pos: Pos) -> Pickup {
        self.pickups[pos.y][pos.x]
    }

    pub fn dots_left(&self) -> usize {
        self.dots_left
    }

    pub fn power_left(&self) -> usize {
        self.power_left
    }

    pub fn is_cleared(&self) -> bool {
        self.dots_left == 0 && self.power_left == 0
    }

    fn collect(&mut self, pos: Pos) {
        match self.pickups[pos.y][pos.x] {
            Pickup::Dot => {
                self.score += DOT_SCORE;
                self.dots_left = self.dots_left.saturating_sub(1);
            }
            Pickup::Power => {
                self.score += POWER_SCORE;
                self.power_left = self.power_left.saturating_sub(1);
            }
            Pickup::None => return,
        }
        self.pickups[pos.y][pos.x] = Pickup::None;
    }

    /// Advances one simulation step. Clearing the board wins over a contact
    /// in the same tick.
    pub fn tick(&mut self, input: Option<Dir>, dt_secs: f32, rng: &mut impl Rng) -> TickOutcome {
        let player_before = self.player.pos;
        self.player.apply_input(&self.grid, input);
        for pos in self.player.advance(&self.grid, dt_secs) {
            self.collect(pos);
        }
        if self.is_cleared() {
            return TickOutcome::Cleared;
        }

        let player = self.player.pos;
        let mut caught = false;
        for enemy in &mut self.enemies {
            let before = enemy.pos;
            enemy.steer(rng);
            enemy.advance(&self.grid, dt_secs);
            let swapped = enemy.pos == player_before && before == player;
            caught |= enemy.pos == player || swapped;
        }
        if caught {
            TickOutcome::Caught
        } else {
            TickOutcome::Continue
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Playing,
    LevelClear,
    GameOver,
}

pub struct Game {
    player_name: String,
    maze: MazeConfig,
    phase: Phase,
    session: Option<Session>,
}

impl Game {
    pub fn new(player_name: impl Into<String>, maze: MazeConfig) -> Self {
        Self {
            player_name: player_name.into(),
            maze,
            phase: Phase::Loading,
            session: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn level(&self) -> u32 {
        self.session.as_ref().map_or(1, |s| s.level)
    }

    pub fn score(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.score)
    }

    /// Builds the first level from `Loading`, or the next one from
    /// `LevelClear` keeping the score. Returns false in any other phase.
    pub fn start(&mut self, rng: &mut impl Rng) -> bool {
        let (level, score) = match (self.phase, &self.session) {
            (Phase::Loading, _) => (1, 0),
            (Phase::LevelClear, Some(done)) => (done.level + 1, done.score),
            _ => return false,
        };
        let grid = generate_with(&self.maze, level, rng);
        let session = Session::new(grid, level, score, rng);
        info!(
            "level {} for {}: {} enemies, {} dots",
            level,
            self.player_name,
            session.enemies.len(),
            session.dots_left()
        );
        self.session = Some(session);
        self.phase = Phase::Playing;
        true
    }

    /// Runs one tick while playing. Returns the new phase on a transition.
    pub fn tick(&mut self, input: Option<Dir>, dt_secs: f32, rng: &mut impl Rng) -> Option<Phase> {
        if self.phase != Phase::Playing {
            return None;
        }
        let session = self.session.as_mut()?;
        let next = match session.tick(input, dt_secs, rng) {
            TickOutcome::Continue => return None,
            TickOutcome::Cleared => Phase::LevelClear,
            TickOutcome::Caught => Phase::GameOver,
        };
        info!(
            "{:?} on level {} with score {}",
            next, session.level, session.score
        );
        self.phase = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemy::Tint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // One cell per tick at player speed.
    const STEP: f32 = TILE_SIZE / PLAYER_SPEED;

    fn corridor() -> Grid {
        Grid::from_ascii(&["#######", "#P..o.#", "#######"])
    }

    #[test]
    fn pickups_score_and_clear_the_level() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = Session::with_enemies(corridor(), 1, 0, Vec::new());
        assert_eq!((session.dots_left(), session.power_left()), (3, 1));
        assert_eq!(session.pickup(Pos::new(1, 1)), Pickup::None);

        assert_eq!(session.tick(Some(Dir::Right), STEP, &mut rng), TickOutcome::Continue);
        assert_eq!(session.score, 10);
        assert_eq!(session.tick(None, STEP, &mut rng), TickOutcome::Continue);
        assert_eq!(session.tick(None, STEP, &mut rng), TickOutcome::Continue);
        assert_eq!(session.score, 70);
        assert_eq!(session.pickup(Pos::new(4, 1)), Pickup::None);
        assert_eq!(session.tick(None, STEP, &mut rng), TickOutcome::Cleared);
        assert_eq!(session.score, 80);
        assert!(session.is_cleared());
    }

    #[test]
    fn queued_turn_waits_for_an_opening() {
        let grid = Grid::from_ascii(&[
            "######",
            "#P...#",
            "###.##",
            "###.##",
            "######",
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = Session::with_enemies(grid, 1, 0, Vec::new());

        session.tick(Some(Dir::Right), STEP, &mut rng);
        assert_eq!(session.player.pos, Pos::new(2, 1));
        session.tick(Some(Dir::Down), STEP, &mut rng);
        assert_eq!(session.player.pos, Pos::new(3, 1));
        assert_eq!(session.player.queued, Some(Dir::Down));
        session.tick(None, STEP, &mut rng);
        assert_eq!(session.player.pos, Pos::new(3, 2));
        session.tick(None, STEP, &mut rng);
        session.tick(None, STEP, &mut rng);
        assert_eq!(session.player.pos, Pos::new(3, 3));
        assert_eq!(session.player.dir, None);
    }

    #[test]
    fn walking_into_an_enemy_is_caught() {
        let mut rng = StdRng::seed_from_u64(0);
        let enemy = Enemy::new(Pos::new(2, 1), 1, Tint::Red);
        let mut session = Session::with_enemies(corridor(), 1, 0, vec![enemy]);
        assert_eq!(session.tick(Some(Dir::Right), STEP, &mut rng), TickOutcome::Caught);
    }

    #[test]
    fn swapping_cells_is_caught() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut enemy = Enemy::new(Pos::new(2, 1), 1, Tint::Blue);
        enemy.speed = PLAYER_SPEED;
        enemy.set_direction(Dir::Left);
        let mut session = Session::with_enemies(corridor(), 1, 0, vec![enemy]);
        assert_eq!(session.tick(Some(Dir::Right), STEP, &mut rng), TickOutcome::Caught);
        assert_eq!(session.player.pos, Pos::new(2, 1));
        assert_eq!(session.enemies[0].pos, Pos::new(1, 1));
    }

    #[test]
    fn game_walks_through_its_phases() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game = Game::new("AAA", MazeConfig::default());
        assert_eq!(game.phase(), Phase::Loading);
        assert!(game.tick(Some(Dir::Up), STEP, &mut rng).is_none());

        assert!(game.start(&mut rng));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!((game.level(), game.score()), (1, 0));
        assert_eq!(game.session().map(|s| s.enemies.len()), Some(3));
        assert!(!game.start(&mut rng));
    }

    #[test]
    fn next_level_carries_the_score() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = Game::new("AAA", MazeConfig::default());
        game.start(&mut rng);
        if let Some(session) = game.session.as_mut() {
            session.score = 120;
        }
        game.phase = Phase::LevelClear;

        assert!(game.start(&mut rng));
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!((game.level(), game.score()), (2, 120));
        assert_eq!(game.session().map(|s| s.enemies.len()), Some(4));
    }

    #[test]
    fn eating_the_last_pickup_clears_the_level() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::new("AAA", MazeConfig::default());
        game.session = Some(Session::with_enemies(corridor(), 1, 0, Vec::new()));
        game.phase = Phase::Playing;

        assert_eq!(game.tick(Some(Dir::Right), STEP, &mut rng), None);
        assert_eq!(game.tick(None, STEP, &mut rng), None);
        assert_eq!(game.tick(None, STEP, &mut rng), None);
        assert_eq!(game.tick(None, STEP, &mut rng), Some(Phase::LevelClear));
        assert_eq!(game.phase(), Phase::LevelClear);
        assert_eq!(game.score(), 80);
        assert!(game.tick(Some(Dir::Left), STEP, &mut rng).is_none());

        assert!(game.start(&mut rng));
        assert_eq!((game.level(), game.score()), (2, 80));
    }

    #[test]
    fn contact_ends_the_game() {
        let mut rng = StdRng::seed_from_u64(0);
        let enemy = Enemy::new(Pos::new(2, 1), 1, Tint::Pink);
        let mut game = Game::new("AAA", MazeConfig::default());
        game.session = Some(Session::with_enemies(corridor(), 1, 0, vec![enemy]));
        game.phase = Phase::Playing;

        assert_eq!(game.tick(Some(Dir::Right), STEP, &mut rng), Some(Phase::GameOver));
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(game.tick(Some(Dir::Right), STEP, &mut rng).is_none());
        assert!(!game.start(&mut rng));
        assert_eq!(game.score(), 10);
    }
}
