//! Gammon -- a backgammon match engine driven over stdin/stdout.
//!
//! Reads one command per line and writes responses to stdout. This binary
//! plays the part of the session layer: it maps connection tokens to seats
//! and resets the match when a seated player leaves mid-game. Logs go to
//! stderr, filtered by `RUST_LOG` (default `warn`).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gammon::board::{ConnectionToken, Phase, Side};
use gammon::config::MatchConfig;
use gammon::engine::Engine;
use gammon::protocol::{format_plays, format_snapshot, parse_command, Command};

/// Backgammon match engine speaking a line protocol on stdin/stdout.
#[derive(Parser, Debug)]
#[command(name = "gammon", version, about, long_about = None)]
struct Cli {
    /// JSON match configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dice seed; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => match MatchConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!(path = %path.display(), "{e}");
                return ExitCode::FAILURE;
            }
        },
        None => MatchConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match run(Engine::new(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("i/o error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the command loop until `quit` or end of input.
fn run(mut engine: Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        if cmd == Command::Quit {
            break;
        }
        dispatch(&mut engine, cmd, &mut out)?;
        out.flush()?;
    }
    out.flush()
}

fn seat(engine: &Engine, token: &ConnectionToken) -> Option<Side> {
    engine.state().seat_of(token)
}

fn dispatch<W: Write>(engine: &mut Engine, cmd: Command, out: &mut W) -> io::Result<()> {
    match cmd {
        Command::IsReady => writeln!(out, "readyok"),
        Command::SetOption { name, value } => {
            let mut config = engine.config().clone();
            if config.set_option(&name, value.as_deref()) {
                engine.set_config(config);
                writeln!(out, "ok")
            } else {
                writeln!(out, "error unknown option or bad value: {name}")
            }
        }
        Command::Join { token } => match engine.assign_player(token) {
            Ok(side) => writeln!(out, "seated {side}"),
            Err(e) => writeln!(out, "error {e}"),
        },
        Command::Leave { token } => match engine.remove_player(&token) {
            Ok(side) => {
                writeln!(out, "left {side}")?;
                if engine.state().phase != Phase::WaitingForPlayers {
                    info!(%token, "player left a started match, resetting");
                    engine.reset_match();
                    writeln!(out, "reset")?;
                }
                Ok(())
            }
            Err(e) => writeln!(out, "error {e}"),
        },
        Command::Begin => {
            if engine.begin_match() {
                writeln!(out, "{}", format_snapshot(engine.state()))
            } else {
                writeln!(out, "error the match cannot begin")
            }
        }
        Command::Roll { token } => {
            let Some(side) = seat(engine, &token) else {
                return writeln!(out, "error no player is seated for connection {token}");
            };
            match engine.roll_dice(side) {
                Ok(state) => writeln!(out, "{}", format_snapshot(&state)),
                Err(e) => writeln!(out, "error {e}"),
            }
        }
        Command::Move { token, mv } => {
            let Some(side) = seat(engine, &token) else {
                return writeln!(out, "error no player is seated for connection {token}");
            };
            match engine.submit_move(side, mv) {
                Ok(state) => writeln!(out, "{}", format_snapshot(&state)),
                Err(e) => writeln!(out, "error {e}"),
            }
        }
        Command::Moves { token } => {
            let Some(side) = seat(engine, &token) else {
                return writeln!(out, "error no player is seated for connection {token}");
            };
            writeln!(out, "moves {}", format_plays(&engine.legal_moves(side)))
        }
        Command::Reset => {
            engine.reset_match();
            writeln!(out, "{}", format_snapshot(engine.state()))
        }
        Command::Show => writeln!(out, "{}", format_snapshot(engine.state())),
        Command::Json => match serde_json::to_string(engine.state()) {
            Ok(json) => writeln!(out, "{json}"),
            Err(e) => writeln!(out, "error {e}"),
        },
        Command::Quit => Ok(()),
    }
}
