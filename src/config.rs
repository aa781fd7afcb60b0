use crate::game::Rules;
use crate::grid::BoundaryPolicy;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "gridsnek")]
#[command(version, about = "Snake on a fixed square grid, in the terminal")]
pub struct Options {
    /// Width and height of the grid, in cells
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(2..=64))]
    pub grid_size: u16,

    /// What happens when the snake leaves the grid
    #[arg(long, value_enum, default_value_t = BoundaryPolicy::Wrap)]
    pub boundary: BoundaryPolicy,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u64).range(100..=500))]
    pub tick_ms: u64,

    /// Seed for food placement
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "gridsnek.log")]
    pub log_file: PathBuf,

    /// off, error, warn, info, debug or trace
    #[arg(long, default_value_t = LevelFilter::Info, value_parser = parse_level)]
    pub log_level: LevelFilter,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("unknown log level '{}'", s))
}

impl Options {
    pub fn rules(&self) -> Rules {
        Rules::new(self.grid_size, self.boundary)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
