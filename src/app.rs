use crate::game::{CellState, GameState, Rules, Status, StepResult};
use crate::grid::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use log::{debug, info};
use rand::Rng;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use std::time::{Duration, Instant};

// Terminal cells are about twice as tall as wide
const CELL_WIDTH: u16 = 2;
const HEAD_SYMBOL: &str = "◆";
const FOOD_SYMBOL: &str = "♥";

pub struct App<R> {
    rules: Rules,
    tick_rate: Duration,
    state: GameState,
    rng: R,
    paused: bool,
    best_score: u32,
    last_tick: Instant,
    exit: bool,
}

impl<R: Rng> App<R> {
    pub fn new(rules: Rules, tick_rate: Duration, rng: R) -> Self {
        App {
            rules,
            tick_rate,
            state: GameState::new(),
            rng,
            paused: false,
            best_score: 0,
            last_tick: Instant::now(),
            exit: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn should_exit(&self) -> bool {
        self.exit
    }

    pub fn time_until_tick(&self) -> Duration {
        self.tick_rate.saturating_sub(self.last_tick.elapsed())
    }

    /// Advances the game if a tick is due.
    pub fn on_frame(&mut self) {
        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
            self.update();
        }
    }

    pub fn update(&mut self) -> StepResult {
        if self.paused {
            return StepResult::Halted;
        }

        let result = self.state.tick(&self.rules, &mut self.rng);
        if self.state.is_game_over() || self.state.is_won() {
            self.best_score = self.best_score.max(self.state.score());
        }
        result
    }

    fn start(&mut self) {
        self.state.start(&self.rules, &mut self.rng);
        self.paused = false;
        // Restart the timer so the first tick gets a full interval
        self.last_tick = Instant::now();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if self.paused {
            info!("Paused at score {}", self.state.score());
        } else {
            info!("Resumed");
            self.last_tick = Instant::now();
        }
    }

    fn steer(&mut self, direction: Direction) {
        if !self.paused && self.state.set_direction(direction) {
            debug!("Turning {:?} -> {:?}", self.state.direction(), direction);
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                info!("Quitting with best score {}", self.best_score);
                self.exit = true;
            }
            KeyCode::Char(' ') | KeyCode::Enter => match self.state.status() {
                Status::Running => self.toggle_pause(),
                Status::Idle | Status::GameOver | Status::Won => self.start(),
            },
            KeyCode::Up | KeyCode::Char('w') => self.steer(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => self.steer(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => self.steer(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => self.steer(Direction::Right),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let score_text = match self.state.status() {
            Status::Idle => format!("SNEK    Best: {}", self.best_score),
            _ => format!(
                "SNEK    Best: {}    Score: {}",
                self.best_score,
                self.state.score()
            ),
        };

        let layout = Layout::default()
            .direction(layout::Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + scores
                Constraint::Min(0),    // Game area
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(score_text)
                .alignment(Alignment::Left)
                .block(Block::default().borders(Borders::ALL)),
            layout[0],
        );

        let title = match (self.state.status(), self.is_paused()) {
            (Status::Running, true) => "Paused. Press SPACE to continue",
            (Status::Running, false) => "Playing",
            _ => "",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner_area = block.inner(layout[1]);
        frame.render_widget(block, layout[1]);

        let overlay = match self.state.status() {
            Status::Idle => Some("Press SPACE to start".to_string()),
            Status::Running => None,
            Status::GameOver => Some(format!(
                "GAME OVER\nFinal Score: {}\nPress SPACE to play again",
                self.state.score()
            )),
            Status::Won => Some(format!(
                "YOU WIN\nFinal Score: {}\nPress SPACE to play again",
                self.state.score()
            )),
        };

        if self.state.status() != Status::Idle {
            frame.render_widget(
                Board {
                    state: &self.state,
                    rules: &self.rules,
                },
                inner_area,
            );
        }
        if let Some(text) = overlay {
            frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner_area);
        }
    }
}

/// The grid, two terminal columns per cell. Cells outside `area` are clipped.
pub struct Board<'a> {
    state: &'a GameState,
    rules: &'a Rules,
}

impl Widget for Board<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid_size = self.rules.grid_size as usize;
        let head = self.state.head().map(|cell| cell.index(self.rules.grid_size));

        for (i, cell_state) in self.state.cells(self.rules).into_iter().enumerate() {
            let col = (i % grid_size) as u16 * CELL_WIDTH;
            let row = (i / grid_size) as u16;
            if col + CELL_WIDTH > area.width || row >= area.height {
                continue;
            }

            let (symbol, style) = match cell_state {
                CellState::Empty => continue,
                CellState::Snake if head == Some(i) => {
                    (HEAD_SYMBOL, Style::default().fg(Color::Yellow).bg(Color::Green))
                }
                CellState::Snake => (" ", Style::default().bg(Color::Green)),
                CellState::Food => (FOOD_SYMBOL, Style::default().fg(Color::LightRed)),
            };

            let (x, y) = (area.x + col, area.y + row);
            buf[(x, y)].set_symbol(symbol).set_style(style);
            buf[(x + 1, y)].set_symbol(" ").set_style(style);
        }
    }
}
