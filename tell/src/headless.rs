//! Headless mode for Scan & Tell.
//!
//! This module provides a simple text-based interface for running the game
//! without a TUI. It's designed for scripting and automated testing.

use std::io::{self, BufRead, Write};

use tell_core::headless::{Command, HeadlessGame, HELP};
use tell_core::{KeyStore, SessionConfig};

/// Run the game in headless mode.
///
/// This provides a simple line-oriented protocol:
/// - Lines starting with `#` are commands (scan, save, assist, quit, ...)
/// - All other lines are sent to the story assistant
pub async fn run_headless(config: SessionConfig, keys: KeyStore) -> anyhow::Result<()> {
    let mut game = HeadlessGame::new(config).with_key(keys.get());

    println!("=== Scan & Tell Headless Mode ===");
    println!(
        "API key: {}",
        if keys.is_configured() { "configured" } else { "not set (use #key <value>)" }
    );
    println!();
    println!("Commands:");
    for line in HELP {
        println!("{line}");
    }
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "failed to read input");
                break;
            }
        };

        let Some(command) = Command::parse(&line) else {
            continue;
        };

        let output = game.execute(command).await;
        for line in &output.lines {
            println!("{line}");
        }
        println!();
        stdout.flush()?;

        if output.quit {
            break;
        }
    }

    Ok(())
}
