//! Putt Runtime
//!
//! Headless host for the mini-golf level. It builds the course, then either
//! runs a fixed number of frames (batch mode) or reads commands from stdin.
//!
//! Run with: cargo run -p putt_runtime
//!       or: cargo run --bin putt -- --steps 600 --swing 400

mod commands;
mod config;

use commands::{status_report, Command, Reply};
use config::RuntimeConfig;
use putt_level::MiniGolf;
use std::error::Error;
use std::io::{BufRead, Write};

fn main() -> Result<(), Box<dyn Error>> {
    // Print banner
    println!();
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                 PUTT MINI-GOLF v0.1.0                     ║");
    println!("║                                                           ║");
    println!("║  Windmill, club and flag. Sink the ball to win.           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = match config::config_path_arg(&args[..]) {
        Some(path) => {
            let mut config = RuntimeConfig::load_from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => RuntimeConfig::load()?,
    };
    config.apply_args(&args)?;

    // Initialize logging
    let default_filter = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter)
    ).init();
    config.print_summary();

    let mut game = MiniGolf::new(config.physics.clone(), config.level()?)?;
    game.initialize()?;

    if config.is_batch() {
        run_batch(&mut game, &config)
    } else {
        run_interactive(&mut game, &config)
    }
}

/// Run `config.steps` frames and print the outcome
fn run_batch(game: &mut MiniGolf, config: &RuntimeConfig) -> Result<(), Box<dyn Error>> {
    if let Some(strength) = config.swing {
        game.swing(strength)?;
    }

    for frame in 0..config.steps {
        game.step(config.timestep)?;
        if game.is_won() {
            log::info!("Goal reached after {} frame(s)", frame + 1);
            break;
        }
    }

    println!("{}", status_report(game)?);
    Ok(())
}

/// Read commands from stdin until `exit` or end of input
fn run_interactive(game: &mut MiniGolf, config: &RuntimeConfig) -> Result<(), Box<dyn Error>> {
    println!("Type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("putt> ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command.execute(game, config.timestep) {
            Ok(Reply::Continue(text)) => println!("{text}"),
            Ok(Reply::Exit) => break,
            Err(e) => log::warn!("{command:?} failed: {e}"),
        }
    }

    Ok(())
}
