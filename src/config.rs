//! Configuration and CLI argument handling

use clap::Parser;

use crate::schedule::Schedule;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "poker-timer")]
#[command(about = "A persisted tournament blind-level timer server")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20560")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite database URL; the file is created if missing
    #[arg(short, long, default_value = "sqlite:poker_timer.db")]
    pub database: String,

    /// Length in minutes of each level of the built-in default schedule
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..))]
    pub level_minutes: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Schedule handed to timers that have not been configured
    pub fn default_schedule(&self) -> Schedule {
        Schedule::default_schedule(i64::from(self.level_minutes) * 60)
    }
}
