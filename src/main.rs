mod app;
mod config;
mod game;
mod grid;

use app::App;
use clap::Parser;
use config::Options;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use rand::Rng;
use ratatui::prelude::*;
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::io;

fn main() -> Result<(), io::Error> {
    let options = Options::parse();

    // Set up logging before anything else, stdout belongs to the terminal UI
    WriteLogger::init(
        options.log_level,
        Config::default(),
        File::create(&options.log_file)?,
    )
    .map_err(io::Error::other)?;

    info!("Starting gridsnek with {:?}", options);

    let mut app = App::new(options.rules(), options.tick_rate(), options.rng());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);
    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(
        "Exiting, last score {} at length {}",
        app.state().score(),
        app.state().snake().len()
    );
    result
}

fn run<B: Backend, R: Rng>(terminal: &mut Terminal<B>, app: &mut App<R>) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        // Wait for input no longer than the next tick
        if event::poll(app.time_until_tick())? {
            if let Event::Key(key) = event::read()? {
                app.handle_input(key);
            }
        }

        app.on_frame();

        if app.should_exit() {
            return Ok(());
        }
    }
}
