use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::game::{Cell, ColorId, Game, Piece};

const PALETTE: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Rgb(250, 100, 25),
];

pub fn palette_color(color: ColorId) -> Color {
    PALETTE[color as usize % PALETTE.len()]
}

/// Locked cells with the falling piece drawn on top.
pub fn compose_cells(game: &Game) -> [[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
    let mut cells = *game.board.rows();
    if let Some(piece) = game.active_piece() {
        for (x, y) in piece.blocks() {
            if x >= 0 && x < BOARD_WIDTH as i32 && y >= 0 && y < BOARD_HEIGHT as i32 {
                cells[y as usize][x as usize] = Cell::Filled(piece.color);
            }
        }
    }
    cells
}

pub fn ui(f: &mut Frame, game: &Game) {
    let size = f.size();

    let board_height = BOARD_HEIGHT as u16 + 2;
    let board_width = BOARD_WIDTH as u16 * 2 + 2; // 2 chars per block

    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(board_height),
            Constraint::Min(1),
        ])
        .split(size);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(board_width),
            Constraint::Length(16), // Right info panel
            Constraint::Min(1),
        ])
        .split(vertical_chunks[1]);

    render_board(f, game, horizontal_chunks[1]);
    render_side_panel(f, game, horizontal_chunks[2]);
}

fn render_board(f: &mut Frame, game: &Game, area: Rect) {
    let cells = compose_cells(game);

    let board_lines: Vec<Line> = cells
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw("  "),
                    Cell::Filled(color) => {
                        Span::styled("██", Style::default().fg(palette_color(*color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let board_widget = Paragraph::new(board_lines)
        .block(Block::default().borders(Borders::ALL).title("nestris"));

    f.render_widget(board_widget, area);
}

fn render_side_panel(f: &mut Frame, game: &Game, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Next piece
            Constraint::Length(6), // Stats
            Constraint::Min(1),    // Controls
        ])
        .split(area);

    render_next_piece(f, &game.next_piece, chunks[0]);
    render_stats(f, game, chunks[1]);
    render_controls(f, chunks[2]);
}

fn piece_preview_lines(piece: &Piece) -> Vec<Line<'static>> {
    piece
        .shape
        .iter()
        .filter(|row| row.iter().any(|&cell| cell))
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&cell| {
                    if cell {
                        Span::styled("██", Style::default().fg(palette_color(piece.color)))
                    } else {
                        Span::raw("  ")
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_next_piece(f: &mut Frame, piece: &Piece, area: Rect) {
    let mut next_lines = vec![Line::from("")];
    next_lines.extend(piece_preview_lines(piece));

    let next_widget = Paragraph::new(next_lines)
        .block(Block::default().borders(Borders::ALL).title("Next"))
        .alignment(Alignment::Center);

    f.render_widget(next_widget, area);
}

fn render_stats(f: &mut Frame, game: &Game, area: Rect) {
    let gravity_ms = game.gravity_interval().as_secs_f64() * 1000.0;
    let stats_text = vec![
        Line::from(vec![Span::styled("Level", Style::default().fg(Color::Cyan))]),
        Line::from(vec![Span::raw(game.level().to_string())]),
        Line::from(vec![Span::raw(format!("{gravity_ms:.0} ms/row"))]),
    ];

    let stats_widget = Paragraph::new(stats_text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);

    f.render_widget(stats_widget, area);
}

fn render_controls(f: &mut Frame, area: Rect) {
    let controls = vec![
        Line::from("← → move"),
        Line::from("↓ soft drop"),
        Line::from("z x rotate"),
        Line::from("r restart"),
        Line::from("q quit"),
    ];

    let controls_widget = Paragraph::new(controls)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(controls_widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{PieceCatalog, PieceDescriptor};
    use crate::input::HeldKeys;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn o_game(now: Instant) -> Game {
        let catalog =
            PieceCatalog::new(vec![PieceDescriptor::parse("O", 2, &["XX", "XX"]).unwrap()]).unwrap();
        let config = GameConfig {
            seed: Some(3),
            ..GameConfig::default()
        };
        Game::new(config, catalog, now).unwrap()
    }

    #[test]
    fn test_compose_overlays_active_piece() {
        let now = Instant::now();
        let mut game = o_game(now);
        assert!(compose_cells(&game).iter().flatten().all(|c| *c == Cell::Empty));

        game.update(&HeldKeys::none(), now);
        let cells = compose_cells(&game);
        assert_eq!(cells[0][4], Cell::Filled(2));
        assert_eq!(cells[1][5], Cell::Filled(2));
        assert!(game.board.is_empty());
    }

    #[test]
    fn test_preview_skips_empty_rows() {
        let piece = Piece::new(
            &PieceDescriptor::parse("I", 4, &["....", "XXXX", "....", "...."]).unwrap(),
        );
        assert_eq!(piece_preview_lines(&piece).len(), 1);
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette_color(0), Color::Red);
        assert_eq!(palette_color(6), Color::Red);
        assert_eq!(palette_color(5), Color::Rgb(250, 100, 25));
    }

    #[test]
    fn test_draws_board_and_next_panel() {
        let now = Instant::now();
        let mut game = o_game(now);
        game.update(&HeldKeys::none(), now);

        let backend = TestBackend::new(60, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &game)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("nestris"));
        assert!(text.contains("Next"));
        assert!(text.contains("██"));
    }
}
