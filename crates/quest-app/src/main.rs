//! Linux Command Quest terminal entry point.
//!
//! Reads command lines from stdin, runs them through the simulated shell,
//! and checks each line against the warm-up mission. The configuration file
//! comes from the first CLI argument or `QUEST_CONFIG`; without either the
//! defaults apply.

mod tutorial;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use quest_terminal::Shell;
use quest_types::config::QuestConfig;

use tutorial::Tutorial;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("QUEST_CONFIG").ok())
    {
        Some(path) => {
            let path = PathBuf::from(path);
            QuestConfig::load(&path)
                .with_context(|| format!("loading config {}", path.display()))?
        },
        None => QuestConfig::default(),
    };
    log::info!(
        "Starting session for {}@{}",
        config.username,
        config.hostname
    );

    let mut shell = Shell::from_config(&config);
    let mut tutorial = Tutorial::new(tutorial::warm_up());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        if let Some(task) = tutorial.current() {
            writeln!(stdout, "[task] {}", task.description)?;
        }
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            writeln!(stdout)?;
            break;
        };
        let line = line?;
        let result = shell.execute(&line);

        if result.clear_screen {
            write!(stdout, "{CLEAR_SCREEN}")?;
        }
        if !result.output.is_empty() {
            writeln!(stdout, "{}", result.output)?;
        }
        if !result.error.is_empty() {
            eprintln!("{}", result.error);
        }
        if result.should_exit {
            break;
        }
        if let Some(message) = tutorial.record(&shell, &line) {
            writeln!(stdout, "[done] {message}")?;
        }
    }

    log::info!("Session ended with {} points", tutorial.points());
    Ok(())
}
