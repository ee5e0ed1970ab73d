//! Terminal projection of a [`Game`].
//!
//! Cells are two columns wide. Only cells whose glyph changed since the last
//! frame are redrawn; a resize forces a full redraw.

use crate::enemy::Tint;
use crate::leaderboard::ScoreEntry;
use crate::maze::{Pos, Tile};
use crate::session::{Game, Phase, Pickup, Session};
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Stdout, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const CELL_W: usize = 2;
const PANEL_GAP: usize = 3;
const PANEL_W: usize = 22;
const NAME_W: usize = 10;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Player,
    Enemy,
    Wall,
    Empty,
    Dot,
    Power,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

pub struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_status: String,
    last_panel: Vec<String>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            last_hud: String::new(),
            last_status: String::new(),
            last_panel: Vec::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

pub fn render(
    stdout: &mut Stdout,
    game: &Game,
    board: &[ScoreEntry],
    renderer: &mut Renderer,
) -> io::Result<()> {
    let session = match game.session() {
        Some(session) => session,
        None => {
            stdout.queue(MoveTo(0, 0))?;
            stdout.queue(Print("Loading..."))?;
            stdout.flush()?;
            renderer.needs_full = true;
            return Ok(());
        }
    };
    let width = session.grid.width();
    let height = session.grid.height();
    let needed_w = (width * CELL_W + PANEL_GAP + PANEL_W) as u16;
    let needed_h = (height + 3) as u16;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(Clear(ClearType::All))?;
        stdout.queue(Print(format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        )))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.last.len() != width * height {
        renderer.last = vec![BLANK; width * height];
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
        renderer.last_panel.clear();
    }

    let hud = format!(
        "Score: {}  Level: {}  Player: {}  (arrows/hjkl move, q quits)",
        game.score(),
        game.level(),
        game.player_name()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for y in 0..height {
        for x in 0..width {
            let cell = cell_for(session, Pos::new(x, y));
            let idx = y * width + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }

    let status = status_line(game);
    if renderer.needs_full || status != renderer.last_status {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y + height as u16))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(status_color(game.phase())))?;
        stdout.queue(Print(&status))?;
        stdout.queue(ResetColor)?;
        renderer.last_status = status;
    }

    let panel = panel_lines(board);
    if panel != renderer.last_panel {
        draw_panel(stdout, renderer, width, &panel)?;
        renderer.last_panel = panel;
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn cell_for(session: &Session, pos: Pos) -> Cell {
    if pos == session.player.pos {
        return Cell {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    if let Some(enemy) = session.enemies.iter().find(|e| e.pos == pos) {
        return Cell {
            glyph: Glyph::Enemy,
            color: tint_color(enemy.tint),
        };
    }
    if session.grid.tile(pos) == Tile::Wall {
        return Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        };
    }
    match session.pickup(pos) {
        Pickup::Dot => Cell {
            glyph: Glyph::Dot,
            color: Color::White,
        },
        Pickup::Power => Cell {
            glyph: Glyph::Power,
            color: Color::Magenta,
        },
        Pickup::None => BLANK,
    }
}

fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Red => Color::Red,
        Tint::Blue => Color::Cyan,
        Tint::Pink => Color::Magenta,
        Tint::Rgb(r, g, b) => Color::Rgb { r, g, b },
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "😃",
        Glyph::Enemy => "👻",
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Dot => "· ",
        Glyph::Power => "● ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn status_line(game: &Game) -> String {
    match game.phase() {
        Phase::Loading | Phase::Playing => String::new(),
        Phase::LevelClear => "LEVEL CLEAR! Press c or Enter to continue".to_string(),
        Phase::GameOver => format!(
            "GAME OVER - Final Score: {} (press q to quit)",
            game.score()
        ),
    }
}

fn status_color(phase: Phase) -> Color {
    match phase {
        Phase::GameOver => Color::Red,
        _ => Color::Yellow,
    }
}

fn panel_lines(board: &[ScoreEntry]) -> Vec<String> {
    let mut lines = vec!["LEADERBOARD".to_string(), String::new()];
    if board.is_empty() {
        lines.push("No scores yet".to_string());
    }
    for (i, entry) in board.iter().enumerate() {
        let name = fit_width(&entry.name, NAME_W);
        let pad = NAME_W - UnicodeWidthStr::width(name.as_str());
        lines.push(format!("{:>2}. {}{} {:>6}", i + 1, name, " ".repeat(pad), entry.score));
    }
    lines
}

/// Truncates to at most `max` terminal columns.
fn fit_width(text: &str, max: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

fn draw_panel(stdout: &mut Stdout, renderer: &Renderer, width: usize, lines: &[String]) -> io::Result<()> {
    let x_pos = renderer.origin_x + (width * CELL_W + PANEL_GAP) as u16;
    let rows = lines.len().max(renderer.last_panel.len());
    for row in 0..rows {
        let line = lines.get(row).map(String::as_str).unwrap_or("");
        let pad = PANEL_W.saturating_sub(UnicodeWidthStr::width(line));
        stdout.queue(MoveTo(x_pos, renderer.origin_y + row as u16))?;
        stdout.queue(SetForegroundColor(if row == 0 { Color::Yellow } else { Color::White }))?;
        stdout.queue(Print(format!("{}{}", line, " ".repeat(pad))))?;
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_board_says_so() {
        assert_eq!(panel_lines(&[]), vec!["LEADERBOARD", "", "No scores yet"]);
    }

    #[test]
    fn board_lines_align_names() {
        let board = vec![
            ScoreEntry::new("AAA", 100),
            ScoreEntry::new("a-very-long-player-name", 50),
        ];
        let lines = panel_lines(&board);
        assert_eq!(lines[2], " 1. AAA           100");
        assert_eq!(lines[3], " 2. a-very-lon     50");
    }

    #[test]
    fn fit_width_counts_wide_chars() {
        assert_eq!(fit_width("漢字漢字漢字", 5), "漢字");
        assert_eq!(fit_width("abc", 10), "abc");
    }
}
