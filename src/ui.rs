//! Terminal UI rendering with ratatui
//!
//! Game screens are drawn from a [`GameSnapshot`] only; nothing here can reach
//! the live engine.

use crate::board::{Cell, BOARD_WIDTH, BUFFER_HEIGHT, TOTAL_HEIGHT};
use crate::game::Phase;
use crate::highscores::ScoreEntry;
use crate::menu::{Menu, MenuBackdrop, MenuItemType, MenuScreen};
use crate::settings::Settings;
use crate::snapshot::GameSnapshot;
use crate::tetromino::{Rotation, TetrominoType};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::f32::consts::TAU;

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(16) = 50
const GAME_WIDTH: u16 = 50;
/// Total height needed: 20 visible rows + 2 buffer rows + 2 for borders = 24
const GAME_HEIGHT: u16 = 24;

/// Display color of each piece type
pub fn piece_color(piece_type: TetrominoType) -> Color {
    match piece_type {
        TetrominoType::I => Color::Rgb(0, 240, 240),
        TetrominoType::O => Color::Rgb(240, 240, 0),
        TetrominoType::T => Color::Rgb(160, 0, 240),
        TetrominoType::S => Color::Rgb(0, 240, 0),
        TetrominoType::Z => Color::Rgb(240, 0, 0),
        TetrominoType::J => Color::Rgb(0, 0, 240),
        TetrominoType::L => Color::Rgb(240, 160, 0),
    }
}

/// Whether clearing rows are lit at this point of the clear animation
pub fn flash_on(progress: f32) -> bool {
    (progress * TAU).sin().abs() > 0.3
}

/// What occupies one board position this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Locked(TetrominoType),
    Active(TetrominoType),
    Ghost(TetrominoType),
    Flash,
}

/// Resolve a board position; the active piece wins over its ghost, which wins over the stack
pub fn cell_view(snapshot: &GameSnapshot<'_>, row: i32, col: i32, show_ghost: bool) -> CellView {
    if let Some(clearing) = &snapshot.clearing {
        if flash_on(clearing.progress) && clearing.rows.contains(&(row as usize)) {
            return CellView::Flash;
        }
    }
    if let Some(piece) = snapshot.piece {
        if piece.block_positions().contains(&(row, col)) {
            return CellView::Active(piece.piece_type);
        }
    }
    if show_ghost {
        if let Some(ghost) = snapshot.ghost_piece() {
            if ghost.block_positions().contains(&(row, col)) {
                return CellView::Ghost(ghost.piece_type);
            }
        }
    }
    match snapshot.board.get(row, col) {
        Some(Cell::Filled(piece_type)) => CellView::Locked(piece_type),
        _ => CellView::Empty,
    }
}

/// Render the main menu over its backdrop
pub fn render_menu(frame: &mut Frame, menu: &Menu, backdrop: &MenuBackdrop, scores: &[ScoreEntry]) {
    let area = frame.area();
    render_backdrop(frame, area, backdrop);

    let (menu_width, menu_height) = match menu.screen {
        MenuScreen::Main => (44u16, 20u16),
        MenuScreen::HighScores => (44u16, 22u16),
        MenuScreen::Settings => (50u16, 22u16),
    };
    let menu_area = center_rect(area, menu_width, menu_height);
    frame.render_widget(Clear, menu_area);

    let show_big_title = menu.screen == MenuScreen::Main;
    let title_height = if show_big_title { 6u16 } else { 3u16 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height), Constraint::Min(8)])
        .split(menu_area);

    if show_big_title {
        let style = Style::default().fg(Color::Cyan);
        let title_lines = vec![
            Line::styled("█▀▄ █   █▀█ █▀▀ █▄▀ █▀▀ ▄▀█ █   █  ", style),
            Line::styled("█▀▄ █   █ █ █   █ █ █▀  █▀█ █   █  ", style),
            Line::styled("▀▀  ▀▀▀ ▀▀▀ ▀▀▀ ▀ ▀ ▀   ▀ ▀ ▀▀▀ ▀▀▀", style),
            Line::raw(""),
            Line::styled(
                match scores.first() {
                    Some(best) => format!("best {}", best.score),
                    None => String::new(),
                },
                Style::default().fg(Color::DarkGray),
            ),
        ];
        frame.render_widget(Paragraph::new(title_lines).alignment(Alignment::Center), layout[0]);
    } else {
        let screen_title = match menu.screen {
            MenuScreen::HighScores => "HIGH SCORES",
            _ => "SETTINGS",
        };
        let title_lines = vec![
            Line::raw(""),
            Line::styled(screen_title, Style::default().fg(Color::Cyan).bold()),
        ];
        frame.render_widget(Paragraph::new(title_lines).alignment(Alignment::Center), layout[0]);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = vec![Line::raw("")];
    if menu.screen == MenuScreen::HighScores {
        lines.extend(score_lines(scores));
        lines.push(Line::raw(""));
    }
    for (i, item) in menu.items.iter().enumerate() {
        lines.push(render_menu_item(item, i == menu.selected));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(controls_hint(menu), Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn score_lines(scores: &[ScoreEntry]) -> Vec<Line<'static>> {
    if scores.is_empty() {
        return vec![Line::styled("No scores yet", Style::default().fg(Color::Gray))];
    }
    scores
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::Gray)),
                Span::styled(format!("{:>8}", entry.score), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("  L{:<2} {:>3} lines", entry.level, entry.lines),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect()
}

/// Render a single menu item based on its type
fn render_menu_item(item: &crate::menu::MenuItem, is_selected: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };
    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let label = Span::styled(format!("{}{}: ", prefix, item.label), base_style);

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let (value_str, value_color) = if *value { ("ON", Color::Green) } else { ("OFF", Color::Red) };
            Line::from(vec![
                label,
                Span::styled(format!("< {} >", value_str), Style::default().fg(value_color).bold()),
            ])
        }
        MenuItemType::Cycle { options, current, .. } => Line::from(vec![
            label,
            Span::styled(format!("< {} >", options[*current]), Style::default().fg(Color::Cyan)),
        ]),
        MenuItemType::Number { value, .. } => Line::from(vec![
            label,
            Span::styled(format!("< {} >", value), Style::default().fg(Color::Cyan)),
        ]),
    }
}

fn controls_hint(menu: &Menu) -> &'static str {
    match menu.items.get(menu.selected).map(|item| &item.item_type) {
        Some(MenuItemType::Toggle { .. } | MenuItemType::Cycle { .. } | MenuItemType::Number { .. }) => {
            "↑↓ Select  ←→ Adjust  Esc Back"
        }
        _ => "↑↓ Select  Enter Confirm  Esc Back",
    }
}

/// Draw the falling pieces straight into the buffer, two columns per cell
fn render_backdrop(frame: &mut Frame, area: Rect, backdrop: &MenuBackdrop) {
    let buf = frame.buffer_mut();
    for piece in backdrop.pieces() {
        let style = Style::default()
            .fg(piece_color(piece.piece_type))
            .add_modifier(Modifier::DIM);
        for (row, col) in piece.cells() {
            if row < 0 || col < 0 {
                continue;
            }
            let (x, y) = (col * 2, row);
            if x + 1 >= i32::from(area.width) || y >= i32::from(area.height) {
                continue;
            }
            for dx in 0..2 {
                let pos = (area.x + (x + dx) as u16, area.y + y as u16);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_symbol("░").set_style(style);
                }
            }
        }
    }
}

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, snapshot: &GameSnapshot<'_>, settings: &Settings, new_high_score: bool) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(16),
        ])
        .split(game_area);

    render_hold(frame, main_layout[0], snapshot.hold, snapshot.hold_used, block_char);
    render_board(frame, main_layout[1], snapshot, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(6)])
        .split(main_layout[2]);

    render_next_queue(frame, right_layout[0], &snapshot.next_queue, block_char);
    render_stats(frame, right_layout[1], snapshot);

    match snapshot.phase {
        Phase::Paused => render_overlay(frame, area, "PAUSED", &["P/Esc resume", "M main menu"]),
        Phase::GameOver => {
            let score = format!("Score: {}", snapshot.score);
            let detail = format!("Level {}  {} lines", snapshot.level, snapshot.lines);
            let mut text = vec![score.as_str(), detail.as_str(), "Enter again  M menu"];
            if new_high_score {
                text.insert(0, "NEW HIGH SCORE!");
            }
            render_overlay(frame, area, "GAME OVER", &text);
        }
        Phase::Playing | Phase::Menu => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
}

/// Render the hold piece box; a used hold is greyed out
fn render_hold(frame: &mut Frame, area: Rect, hold: Option<TetrominoType>, used: bool, block_char: &str) {
    let block = panel(" HOLD ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(piece_type) = hold {
        let color = if used { Color::DarkGray } else { piece_color(piece_type) };
        render_mini_piece(frame, inner, piece_type, color, block_char);
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[TetrominoType], block_char: &str) {
    let block = panel(" NEXT ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if queue.is_empty() {
        return;
    }
    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); queue.len()])
        .split(inner);

    for (piece_area, &piece_type) in piece_areas.iter().zip(queue) {
        render_mini_piece(frame, *piece_area, piece_type, piece_color(piece_type), block_char);
    }
}

/// Render a small piece preview (for hold and next queue)
fn render_mini_piece(frame: &mut Frame, area: Rect, piece_type: TetrominoType, color: Color, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }
    let shape = piece_type.shape(Rotation::North);

    // Normalize to the bounding box; every spawn shape fits in two rows
    let min_row = shape.iter().map(|(r, _)| *r).min().unwrap_or(0);
    let min_col = shape.iter().map(|(_, c)| *c).min().unwrap_or(0);

    let lines: Vec<Line> = (0..2)
        .map(|row| {
            let spans: Vec<Span> = (0..4)
                .map(|col| {
                    if shape.contains(&(min_row + row, min_col + col)) {
                        Span::styled(block_char.to_string(), Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Render the game board, buffer rows included so a spawning piece is visible
fn render_board(frame: &mut Frame, area: Rect, snapshot: &GameSnapshot<'_>, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = (0..TOTAL_HEIGHT)
        .map(|row| {
            let is_buffer_row = row < BUFFER_HEIGHT;
            let spans: Vec<Span> = (0..BOARD_WIDTH)
                .map(|col| {
                    let view = cell_view(snapshot, row as i32, col as i32, show_ghost && !is_buffer_row);
                    let (text, style) = match view {
                        CellView::Active(t) | CellView::Locked(t) => (block_char, Style::default().fg(piece_color(t))),
                        CellView::Ghost(t) => (ghost_char, Style::default().fg(piece_color(t)).dim()),
                        CellView::Flash => (block_char, Style::default().fg(Color::White).bold()),
                        CellView::Empty if is_buffer_row => (EMPTY, Style::default()),
                        CellView::Empty => (" .", Style::default().fg(Color::DarkGray)),
                    };
                    Span::styled(text, style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, snapshot: &GameSnapshot<'_>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));
    let lines = vec![
        label("SCORE"),
        Line::from(Span::styled(snapshot.score.to_string(), Style::default().fg(Color::Yellow).bold())),
        Line::raw(""),
        label("LEVEL"),
        Line::from(Span::styled(snapshot.level.to_string(), Style::default().fg(Color::Cyan))),
        Line::raw(""),
        label("LINES"),
        Line::from(Span::styled(snapshot.lines.to_string(), Style::default().fg(Color::Green))),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &[&str]) {
    let popup_width = 28u16;
    let popup_height = 4 + subtitle.len() as u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
    ];
    text.extend(
        subtitle
            .iter()
            .map(|line| Line::styled(line.to_string(), Style::default().fg(Color::Gray))),
    );

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::piece::Piece;
    use crate::snapshot::ClearingRows;
    use ratatui::{backend::TestBackend, Terminal};

    fn snapshot(board: &Board, piece: Option<Piece>) -> GameSnapshot<'_> {
        GameSnapshot {
            phase: Phase::Playing,
            board,
            piece,
            ghost_row: piece.map(|p| board.ghost_row(&p)),
            hold: None,
            hold_used: false,
            next_queue: vec![TetrominoType::I, TetrominoType::O, TetrominoType::T],
            score: 1200,
            lines: 12,
            level: 2,
            clearing: None,
        }
    }

    #[test]
    fn test_cell_view_layers() {
        let mut board = Board::new();
        board.set(21, 0, Cell::Filled(TetrominoType::Z));
        let piece = Piece::new(TetrominoType::O);
        let view = snapshot(&board, Some(piece));

        // O spawns on cols 4-5 of rows 0-1 and lands on rows 20-21
        assert_eq!(cell_view(&view, 0, 4, true), CellView::Active(TetrominoType::O));
        assert_eq!(cell_view(&view, 21, 4, true), CellView::Ghost(TetrominoType::O));
        assert_eq!(cell_view(&view, 21, 4, false), CellView::Empty);
        assert_eq!(cell_view(&view, 21, 0, true), CellView::Locked(TetrominoType::Z));
        assert_eq!(cell_view(&view, 10, 0, true), CellView::Empty);
    }

    #[test]
    fn test_clearing_rows_flash() {
        let board = Board::new();
        let rows = [21usize];
        let mut view = snapshot(&board, None);
        view.clearing = Some(ClearingRows { rows: &rows, progress: 0.25 });
        assert_eq!(cell_view(&view, 21, 3, true), CellView::Flash);
        assert_eq!(cell_view(&view, 20, 3, true), CellView::Empty);

        view.clearing = Some(ClearingRows { rows: &rows, progress: 0.0 });
        assert_eq!(cell_view(&view, 21, 3, true), CellView::Empty);
    }

    #[test]
    fn test_render_game_smoke() {
        let board = Board::new();
        let mut view = snapshot(&board, Some(Piece::new(TetrominoType::T)));
        view.phase = Phase::GameOver;
        let settings = Settings::default();

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render_game(frame, &view, &settings, true))
            .unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("GAME OVER"));
        assert!(content.contains("NEW HIGH SCORE!"));
    }

    #[test]
    fn test_render_menu_smoke() {
        let menu = Menu::high_scores();
        let backdrop = MenuBackdrop::with_seed(80, 30, 1);
        let scores = [ScoreEntry {
            score: 4321,
            lines: 9,
            level: 1,
            timestamp: 0,
        }];

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|frame| render_menu(frame, &menu, &backdrop, &scores))
            .unwrap();
        let content: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(content.contains("HIGH SCORES"));
        assert!(content.contains("4321"));
    }
}
