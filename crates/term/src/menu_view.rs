//! Title, menu, player selection and results screens.
//!
//! Like [`crate::GameView`] these only paint into a framebuffer; the app state
//! machine decides which one is shown.

use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::game_view::Viewport;

const TITLE: [&str; 5] = [
    "███ ███ █   █ ███ ███ ███ ███",
    "█   █ █ █   █  █  █ █  █  █  ",
    "███ ███ █   █  █  ██   █  ███",
    "  █ █   █   █  █  █ █  █    █",
    "███ █   ███ █  █  █ █ ███ ███",
];

/// One line of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRow<'a> {
    pub name: &'a str,
    pub score: u32,
    pub lines: u32,
}

fn accent() -> CellStyle {
    CellStyle::fg(Rgb::new(80, 220, 220)).bold()
}

fn hint() -> CellStyle {
    CellStyle::fg(Rgb::new(140, 140, 150)).dim()
}

fn begin(fb: &mut FrameBuffer, viewport: Viewport) {
    fb.resize(viewport.width, viewport.height);
    fb.clear(CellStyle::default().into_cell(' '));
}

pub fn render_title(fb: &mut FrameBuffer, viewport: Viewport, high_score: u32) {
    begin(fb, viewport);
    let w = viewport.width;
    let top = viewport.height.saturating_sub(TITLE.len() as u16 + 6) / 2;

    for (i, line) in TITLE.iter().enumerate() {
        fb.put_str_centered(0, w, top + i as u16, line, accent());
    }

    let y = top + TITLE.len() as u16 + 2;
    let mut line = String::from("HIGH SCORE ");
    line.push_str(&high_score.to_string());
    fb.put_str_centered(0, w, y, &line, CellStyle::default().bold());
    fb.put_str_centered(0, w, y + 2, "press Enter", hint());
}

pub fn render_menu(fb: &mut FrameBuffer, viewport: Viewport, items: &[&str], selected: usize) {
    begin(fb, viewport);
    let w = viewport.width;
    let top = viewport.height.saturating_sub(items.len() as u16 * 2) / 2;

    for (i, item) in items.iter().enumerate() {
        let y = top + i as u16 * 2;
        if i == selected {
            let text = format!("> {} <", item);
            fb.put_str_centered(0, w, y, &text, accent());
        } else {
            fb.put_str_centered(0, w, y, item, CellStyle::default());
        }
    }
    fb.put_str_centered(0, w, viewport.height.saturating_sub(1), "Up/Down  Enter  Esc", hint());
}

/// Player count picker. `controls[i]` describes player `i`'s keys.
pub fn render_players_select(
    fb: &mut FrameBuffer,
    viewport: Viewport,
    players: usize,
    controls: &[String],
) {
    begin(fb, viewport);
    let w = viewport.width;
    let top = viewport.height.saturating_sub(controls.len() as u16 + 6) / 2;

    fb.put_str_centered(0, w, top, "PLAYERS", CellStyle::default().bold());
    let count = format!("<  {}  >", players);
    fb.put_str_centered(0, w, top + 2, &count, accent());

    for (i, line) in controls.iter().enumerate() {
        let style = if i < players {
            CellStyle::default()
        } else {
            hint()
        };
        fb.put_str_centered(0, w, top + 4 + i as u16, line, style);
    }
    fb.put_str_centered(0, w, viewport.height.saturating_sub(1), "Left/Right  Enter  Esc", hint());
}

pub fn render_results(
    fb: &mut FrameBuffer,
    viewport: Viewport,
    rows: &[ResultRow<'_>],
    high_score: Option<u32>,
    new_record: bool,
) {
    begin(fb, viewport);
    let w = viewport.width;
    let top = viewport.height.saturating_sub(rows.len() as u16 + 8) / 2;

    fb.put_str_centered(0, w, top, "RESULTS", CellStyle::default().bold());

    let best = rows.iter().map(|r| r.score).max().unwrap_or(0);
    for (i, row) in rows.iter().enumerate() {
        let line = format!("{:<4} {:>9} pts {:>5} lines", row.name, row.score, row.lines);
        let style = if rows.len() > 1 && row.score == best {
            accent()
        } else {
            CellStyle::default()
        };
        fb.put_str_centered(0, w, top + 2 + i as u16, &line, style);
    }

    let mut y = top + 3 + rows.len() as u16;
    if let Some(high) = high_score {
        let line = format!("HIGH SCORE {}", high);
        fb.put_str_centered(0, w, y, &line, CellStyle::default());
        y += 1;
    }
    if new_record {
        fb.put_str_centered(0, w, y, "NEW RECORD!", CellStyle::fg(Rgb::new(255, 230, 120)).bold());
    }
    fb.put_str_centered(0, w, viewport.height.saturating_sub(1), "Enter", hint());
}
