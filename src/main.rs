use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::info;
use maze_chase::config::Settings;
use maze_chase::leaderboard::Leaderboard;
use maze_chase::maze::Dir;
use maze_chase::render::{render, Renderer};
use maze_chase::session::{Game, Phase};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_PLAYER: &str = "Player";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Settings::from_env();
    let player_name = match settings.player_name.clone() {
        Some(name) => name,
        None => prompt_player_name()?,
    };
    let mut leaderboard = Leaderboard::from_config(&settings.leaderboard);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings, player_name, &mut leaderboard);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn prompt_player_name() -> io::Result<String> {
    print!("Enter your name: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let name = line.trim();
    Ok(if name.is_empty() {
        DEFAULT_PLAYER.to_string()
    } else {
        name.to_string()
    })
}

fn run(
    stdout: &mut Stdout,
    settings: &Settings,
    player_name: String,
    leaderboard: &mut Leaderboard,
) -> anyhow::Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut board = leaderboard.top();
    let mut game = Game::new(player_name, settings.maze);
    game.start(&mut rng);

    let mut renderer = Renderer::new();
    let tick = Duration::from_millis(settings.tick_ms);
    let dt_secs = tick.as_secs_f32();
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let mut last_tick = Instant::now();
    let mut pending: Option<Dir> = None;

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(())
                    }
                    KeyCode::Char('c') | KeyCode::Enter if game.phase() == Phase::LevelClear => {
                        game.start(&mut rng);
                        pending = None;
                        last_tick = Instant::now();
                    }
                    code => {
                        if let Some(dir) = dir_for_key(code) {
                            pending = Some(dir);
                        }
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            if let Some(Phase::GameOver) = game.tick(pending.take(), dt_secs, &mut rng) {
                info!("{} finished with {}", game.player_name(), game.score());
                leaderboard.record(game.player_name(), game.score());
                board = leaderboard.top();
            }
        }
        render(stdout, &game, &board, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}
