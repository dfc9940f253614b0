use std::collections::VecDeque;
use std::sync::Arc;

use core_overlay::{
    keyword_scores, Bounds, Category, DirectionalTag, KeywordTable, Rgb, SectorRecord,
    TacticalOverlay,
};
use ratatui::layout::{Constraint, Direction, Layout, Margin};
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub struct UiState {
    pub overlay: TacticalOverlay,
    pub keywords: Arc<KeywordTable>,
    pub selected: DirectionalTag,
    pub explain: bool,
    pub logs: VecDeque<String>,
    pub max_logs: usize,
}

impl UiState {
    pub fn new(overlay: TacticalOverlay, keywords: Arc<KeywordTable>) -> Self {
        Self {
            overlay,
            keywords,
            selected: DirectionalTag::C,
            explain: false,
            logs: VecDeque::new(),
            max_logs: 6,
        }
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    /// Step the selection by one cell; moves off the grid edge are ignored.
    pub fn move_selection(&mut self, dlat: i8, dlng: i8) {
        let (lat, lng) = self.selected.offset();
        if let Some(next) = DirectionalTag::from_offset(lat + dlat, lng + dlng) {
            self.selected = next;
        }
    }

    pub fn selected_sector(&self) -> &SectorRecord {
        self.overlay.sector(self.selected)
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(8),
        ])
        .split(frame.size());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    draw_header(frame, chunks[0], state);
    draw_grid(frame, body[0], state);
    draw_details(frame, body[1], state);
    draw_logs(frame, chunks[2], state);
}

fn category_color(category: Category) -> Color {
    let Rgb { r, g, b } = category.color();
    Color::Rgb(r, g, b)
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Tactical Overlay Inspector");
    let name = if state.overlay.name.is_empty() {
        "(unnamed)"
    } else {
        state.overlay.name.as_str()
    };
    let line = Line::from(vec![
        Span::styled(name, Style::default().fg(Color::Green)),
        Span::raw(format!(
            " @ {:.5}, {:.5}",
            state.overlay.focal.lat, state.overlay.focal.lng
        )),
        Span::raw(" | arrows move, e explain, q exit"),
    ]);
    let text = Paragraph::new(line).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_grid(frame: &mut Frame, area: Rect, state: &UiState) {
    let thirds = [
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(thirds)
        .split(area);

    for (row_area, row) in rows.iter().zip(state.overlay.rows()) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(thirds)
            .split(*row_area);
        for (cell_area, sector) in cells.iter().zip(row) {
            let color = category_color(sector.category);
            let mut border = Style::default().fg(color);
            if sector.tag == state.selected {
                border = border.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!("{} {}", sector.tag, sector.category.label()));
            let paragraph = Paragraph::new(sector.description.as_str())
                .style(Style::default().fg(color))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(paragraph, *cell_area);
        }
    }
}

fn draw_details(frame: &mut Frame, area: Rect, state: &UiState) {
    let sector = state.selected_sector();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} ", sector.tag),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                sector.category.label(),
                Style::default().fg(category_color(sector.category)),
            ),
            Span::raw(format!(" ({:?})", sector.source)),
        ]),
        Line::from(Span::raw(sector.description.clone())),
        Line::from(Span::raw(corner_label(&sector.bounds))),
    ];

    if state.explain {
        lines.push(Line::from(""));
        for (category, hits) in keyword_scores(&sector.description, &state.keywords) {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<11}", category.label()),
                    Style::default().fg(category_color(category)),
                ),
                Span::raw(format!("{hits:>3}")),
            ]));
        }
    }

    lines.push(Line::from(""));
    for entry in state.overlay.legend() {
        lines.push(Line::from(vec![
            Span::styled("■ ", Style::default().fg(category_color(entry.category))),
            Span::raw(entry.label),
        ]));
    }
    if !state.overlay.features.is_empty() {
        lines.push(Line::from(Span::raw(format!(
            "{} features",
            state.overlay.features.len()
        ))));
    }

    let block = Block::default().borders(Borders::ALL).title("Sector");
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

/// South-west and north-east corners, as the map layer receives them.
fn corner_label(bounds: &Bounds) -> String {
    let [[south, west], [north, east]] = bounds.corners();
    format!("SW {south:.5}, {west:.5}  NE {north:.5}, {east:.5}")
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Logs");
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry)))
        .collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_overlay::{build_tactical_overlay, AnalysisInput, OverlayConfig};

    fn state() -> UiState {
        let config = OverlayConfig::builtin();
        let overlay = build_tactical_overlay(&AnalysisInput::default(), &config);
        UiState::new(overlay, config.keywords.clone())
    }

    #[test]
    fn selection_stops_at_grid_edge() {
        let mut state = state();
        state.move_selection(1, 0);
        assert_eq!(state.selected, DirectionalTag::N);
        state.move_selection(1, 0);
        assert_eq!(state.selected, DirectionalTag::N);
        state.move_selection(0, -1);
        assert_eq!(state.selected, DirectionalTag::NW);
        state.move_selection(-1, 1);
        assert_eq!(state.selected_sector().tag, DirectionalTag::C);
    }

    #[test]
    fn corner_label_lists_south_west_then_north_east() {
        let bounds = Bounds {
            south: 1.0,
            west: 2.0,
            north: 1.5,
            east: 2.5,
        };
        assert_eq!(
            corner_label(&bounds),
            "SW 1.00000, 2.00000  NE 1.50000, 2.50000"
        );
    }

    #[test]
    fn log_buffer_is_bounded() {
        let mut state = state();
        for i in 0..10 {
            state.push_log(format!("line {i}\n"));
        }
        state.push_log("\n");
        assert_eq!(state.logs.len(), state.max_logs);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 9"));
    }
}
