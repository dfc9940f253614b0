use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Result;
use core_overlay::{DirectionalTag, KeywordTable, TacticalOverlay};
use crossterm::event::{self, Event, KeyCode};
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use tracing::{debug, info};

use crate::ui::{draw_ui, UiState};

pub struct InspectorApp {
    terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
    ui_state: UiState,
    log_receiver: Receiver<String>,
}

impl InspectorApp {
    pub fn new(
        overlay: TacticalOverlay,
        keywords: Arc<KeywordTable>,
        log_receiver: Receiver<String>,
    ) -> Result<Self> {
        let stdout = std::io::stdout();
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        crossterm::terminal::enable_raw_mode()?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            ui_state: UiState::new(overlay, keywords),
            log_receiver,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let mut last_draw = Instant::now();
        let mut dirty = true;

        loop {
            while let Ok(line) = self.log_receiver.try_recv() {
                self.ui_state.push_log(line);
            }

            if dirty || last_draw.elapsed() >= Duration::from_millis(100) {
                self.terminal.draw(|frame| draw_ui(frame, &self.ui_state))?;
                last_draw = Instant::now();
                dirty = false;
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Up | KeyCode::Char('k') => self.ui_state.move_selection(1, 0),
                        KeyCode::Down | KeyCode::Char('j') => self.ui_state.move_selection(-1, 0),
                        KeyCode::Left | KeyCode::Char('h') => self.ui_state.move_selection(0, -1),
                        KeyCode::Right | KeyCode::Char('l') => self.ui_state.move_selection(0, 1),
                        KeyCode::Char('c') => {
                            self.ui_state.selected = DirectionalTag::C;
                        }
                        KeyCode::Char('e') => {
                            self.ui_state.explain = !self.ui_state.explain;
                            info!(explain = self.ui_state.explain, "Keyword breakdown toggled");
                        }
                        _ => {}
                    }
                    debug!(selected = %self.ui_state.selected, "selection.changed");
                    dirty = true;
                }
            }
        }

        self.terminal.show_cursor()?;
        crossterm::terminal::disable_raw_mode()?;
        Ok(())
    }
}
