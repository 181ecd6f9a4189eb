//! TUI rendering for Capital Quiz using ratatui.

mod input;
mod theme;

pub use input::{InputPump, apply_event, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use capquiz_engine::{App, PairingMachine, RoundView, TileArea, TileId, TileVisual};

pub const TITLE: &str = "Capital Quiz";

const TILE_HEIGHT: u16 = 3;
const TILE_GAP_X: u16 = 2;
const TILE_GAP_Y: u16 = 1;
/// Borders plus one cell of padding and the focus marker.
const TILE_CHROME: u16 = 6;
/// Narrowest tile before the board is considered too small (four label cells).
const MIN_TILE_WIDTH: u16 = TILE_CHROME + 4;

/// Placement of the tile grid inside the board area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    /// One cell per tile, in board order. Tiles that do not fit are omitted.
    pub cells: Vec<Rect>,
}

/// Lays `count` equally sized tiles out row-major, centered in `area`.
#[must_use]
pub fn grid_layout(area: Rect, count: usize, tile_width: u16) -> GridLayout {
    if count == 0 || area.width == 0 || area.height == 0 {
        return GridLayout {
            columns: 1,
            cells: Vec::new(),
        };
    }

    let tile_width = tile_width.clamp(1, area.width);
    let fit = usize::from((area.width + TILE_GAP_X) / (tile_width + TILE_GAP_X)).max(1);
    let columns = fit.min(count);
    let rows = count.div_ceil(columns);

    // columns <= area.width, so these stay within u16
    let cols_u16 = u16::try_from(columns).unwrap_or(u16::MAX);
    let rows_u16 = u16::try_from(rows).unwrap_or(u16::MAX);
    let total_width = cols_u16
        .saturating_mul(tile_width)
        .saturating_add((cols_u16 - 1).saturating_mul(TILE_GAP_X));
    let total_height = rows_u16
        .saturating_mul(TILE_HEIGHT)
        .saturating_add(rows_u16.saturating_sub(1).saturating_mul(TILE_GAP_Y));

    let left = area.x + area.width.saturating_sub(total_width) / 2;
    let top = area.y + area.height.saturating_sub(total_height) / 2;
    let bottom = u32::from(area.y) + u32::from(area.height);

    let mut cells = Vec::with_capacity(count);
    for index in 0..count {
        let col = u16::try_from(index % columns).unwrap_or(u16::MAX);
        let row = u16::try_from(index / columns).unwrap_or(u16::MAX);
        let x = left.saturating_add(col.saturating_mul(tile_width + TILE_GAP_X));
        let y = top.saturating_add(row.saturating_mul(TILE_HEIGHT + TILE_GAP_Y));
        if u32::from(y) + u32::from(TILE_HEIGHT) > bottom {
            break;
        }
        cells.push(Rect::new(x, y, tile_width, TILE_HEIGHT));
    }

    GridLayout { columns, cells }
}

fn grid_fits(area: Rect, count: usize, tile_width: u16) -> bool {
    let fit = usize::from((area.width + TILE_GAP_X) / (tile_width + TILE_GAP_X)).max(1);
    let rows = u32::try_from(count.div_ceil(fit.min(count).max(1))).unwrap_or(u32::MAX);
    let height = rows
        .saturating_mul(u32::from(TILE_HEIGHT))
        .saturating_add(rows.saturating_sub(1).saturating_mul(u32::from(TILE_GAP_Y)));
    height <= u32::from(area.height)
}

/// Widest tile width up to `natural` at which all `count` tiles fit in
/// `area`. `None` when even the narrowest tiles overflow.
#[must_use]
pub fn fit_tile_width(area: Rect, count: usize, natural: u16) -> Option<u16> {
    let widest = natural.min(area.width);
    let floor = MIN_TILE_WIDTH.min(natural).max(1);
    if count == 0 || widest < floor {
        return None;
    }
    (floor..=widest)
        .rev()
        .find(|&width| grid_fits(area, count, width))
}

/// Cuts `label` to `max_width` display cells, ending in `ellipsis` when cut.
#[must_use]
pub fn truncate_label(label: &str, max_width: usize, ellipsis: &str) -> String {
    if label.width() <= max_width {
        return label.to_string();
    }
    let budget = max_width.saturating_sub(ellipsis.width());
    let mut used = 0;
    let mut out = String::new();
    for ch in label.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(ch);
    }
    let mut out = out.trim_end().to_string();
    out.push_str(ellipsis);
    out
}

/// What the board area ended up showing this frame.
enum BoardDraw {
    Message,
    Tiles(Vec<TileArea>, usize),
    TooSmall,
}

/// Main draw function. Also records where tiles landed so mouse clicks can be
/// mapped back to them.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.bg_dark));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),    // Board
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    let board = Block::default()
        .borders(Borders::ALL)
        .border_set(glyphs.border)
        .border_style(Style::default().fg(palette.text_disabled))
        .title(Line::from(Span::styled(
            format!(" {TITLE} "),
            styles::title(&palette),
        )))
        .title_alignment(Alignment::Center);
    let board_inner = board.inner(chunks[0]);
    frame.render_widget(board, chunks[0]);

    let drawn = match app.round_view() {
        RoundView::Loading => {
            draw_loading(frame, app, board_inner, &palette);
            BoardDraw::Message
        }
        RoundView::Failed(message) => {
            draw_failure(frame, message, board_inner, &palette, &glyphs);
            BoardDraw::Message
        }
        RoundView::Playing(machine) if machine.is_complete() => {
            draw_complete(frame, machine, board_inner, &palette, &glyphs);
            BoardDraw::Message
        }
        RoundView::Playing(machine) => draw_tiles(
            frame,
            machine,
            app.focused_tile(),
            board_inner,
            &palette,
            &glyphs,
        ),
    };

    match drawn {
        BoardDraw::Message => app.set_tile_layout(Vec::new(), 1),
        BoardDraw::Tiles(areas, columns) => app.set_tile_layout(areas, columns),
        BoardDraw::TooSmall => app.hide_board(),
    }

    draw_status_bar(frame, app, chunks[1], &palette, &glyphs);
}

fn draw_tiles(
    frame: &mut Frame,
    machine: &PairingMachine,
    focused: Option<TileId>,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) -> BoardDraw {
    let tiles = machine.tiles();
    let label_width = tiles
        .iter()
        .map(|tile| tile.name().width())
        .max()
        .unwrap_or(0);
    let natural = u16::try_from(label_width)
        .unwrap_or(u16::MAX)
        .saturating_add(TILE_CHROME);
    let Some(tile_width) = fit_tile_width(area, tiles.len(), natural) else {
        draw_too_small(frame, tiles.len(), area, palette);
        return BoardDraw::TooSmall;
    };
    let name_width = usize::from(tile_width.saturating_sub(TILE_CHROME));
    let grid = grid_layout(area, tiles.len(), tile_width);
    let locked = machine.error_flag();

    let mut areas = Vec::with_capacity(grid.cells.len());
    for (tile, cell) in tiles.iter().zip(grid.cells.iter().copied()) {
        let visual = machine.visual(tile.id());
        let (bg, fg) = palette.tile_colors(visual);
        let is_focused = focused == Some(tile.id());

        let mut body = Style::default().bg(bg).fg(fg);
        if locked && visual != TileVisual::Error {
            body = body.add_modifier(Modifier::DIM);
        }
        let border = if is_focused {
            Style::default()
                .fg(palette.focus)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text_disabled)
        };
        let name = truncate_label(tile.name(), name_width, glyphs.ellipsis);
        let label = if is_focused {
            format!("{} {name}", glyphs.focus_marker)
        } else {
            name
        };
        let label_style = if is_focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_set(glyphs.border)
            .border_style(border)
            .style(body);
        let widget = Paragraph::new(Line::from(Span::styled(label, label_style)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(widget, cell);

        areas.push(TileArea {
            id: tile.id(),
            x: cell.x,
            y: cell.y,
            width: cell.width,
            height: cell.height,
        });
    }

    BoardDraw::Tiles(areas, grid.columns)
}

fn draw_too_small(frame: &mut Frame, count: usize, area: Rect, palette: &Palette) {
    let lines = vec![
        Line::from(Span::styled(
            "Terminal too small",
            Style::default()
                .fg(palette.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Enlarge the window to show all {count} tiles"),
            Style::default().fg(palette.text_muted),
        )),
    ];
    draw_centered(frame, lines, area);
}

/// Renders `lines` vertically centered in `area`.
fn draw_centered(frame: &mut Frame, lines: Vec<Line<'_>>, area: Rect) {
    let height = u16::try_from(lines.len())
        .unwrap_or(u16::MAX)
        .min(area.height);
    let target = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, target);
}

fn draw_loading(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let spinner = spinner_frame(app.tick_count(), app.ui_options());
    let lines = vec![Line::from(Span::styled(
        format!("{spinner} Fetching countries..."),
        Style::default().fg(palette.primary),
    ))];
    draw_centered(frame, lines, area);
}

fn draw_failure(frame: &mut Frame, message: &str, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let lines = vec![
        Line::from(Span::styled(
            format!("{} Could not load countries", glyphs.failure),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(palette.text_muted),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("r", styles::key_highlight(palette)),
            Span::styled(" retry  ", styles::key_hint(palette)),
            Span::styled("q", styles::key_highlight(palette)),
            Span::styled(" quit", styles::key_hint(palette)),
        ]),
    ];
    draw_centered(frame, lines, area);
}

fn draw_complete(
    frame: &mut Frame,
    machine: &PairingMachine,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let stats = machine.stats();
    let lines = vec![
        Line::from(Span::styled(
            format!("{} Congratulations!", glyphs.success),
            Style::default()
                .fg(palette.success)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(
                "{} pairs matched in {} attempts ({} mistakes)",
                machine.total_pairs(),
                stats.attempts,
                stats.mistakes
            ),
            Style::default().fg(palette.text_primary),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("r", styles::key_highlight(palette)),
            Span::styled(" play again  ", styles::key_hint(palette)),
            Span::styled("q", styles::key_highlight(palette)),
            Span::styled(" quit", styles::key_hint(palette)),
        ]),
    ];
    draw_centered(frame, lines, area);
}

pub(crate) fn draw_status_bar(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let move_keys = if app.ui_options().ascii_only {
        "arrows/hjkl"
    } else {
        "←↓↑→/hjkl"
    };
    let hints = Line::from(vec![
        Span::raw(" "),
        Span::styled(move_keys, styles::key_highlight(palette)),
        Span::styled(" move  ", styles::key_hint(palette)),
        Span::styled("Enter", styles::key_highlight(palette)),
        Span::styled(" select  ", styles::key_hint(palette)),
        Span::styled("q", styles::key_highlight(palette)),
        Span::styled(" quit", styles::key_hint(palette)),
    ]);

    let mut status: Vec<Span> = Vec::new();
    if let Some(machine) = app.machine() {
        let stats = machine.stats();
        let separator = format!(" {} ", glyphs.bullet);
        status.push(Span::styled(
            format!("Pairs {}/{}", stats.matches, machine.total_pairs()),
            Style::default().fg(palette.success),
        ));
        status.push(Span::styled(
            separator.clone(),
            Style::default().fg(palette.text_disabled),
        ));
        status.push(Span::styled(
            format!("Mistakes {}", stats.mistakes),
            Style::default().fg(if stats.mistakes == 0 {
                palette.text_muted
            } else {
                palette.warning
            }),
        ));
        if let Some(remaining) = machine.error_remaining(Instant::now()) {
            status.push(Span::styled(
                separator,
                Style::default().fg(palette.text_disabled),
            ));
            status.push(Span::styled(
                format!("Resetting in {:.1}s", remaining.as_secs_f32()),
                Style::default().fg(palette.error),
            ));
        }
    }
    status.push(Span::raw(" "));

    let status = Line::from(status);
    let status_width = u16::try_from(status.width()).unwrap_or(u16::MAX);
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(status_width)])
        .split(area);

    frame.render_widget(Paragraph::new(hints), parts[0]);
    frame.render_widget(
        Paragraph::new(status).alignment(Alignment::Right),
        parts[1],
    );
}
