//! Command parser.
//!
//! Parses incoming text commands into structured `Command` variants that the
//! binary's main loop dispatches on.

use tracing::warn;

use crate::board::{ConnectionToken, Move, BAR};

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; answered with `readyok`.
    IsReady,

    /// Set a match option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Seat a connection.
    Join { token: ConnectionToken },

    /// A connection went away.
    Leave { token: ConnectionToken },

    /// Run the opening roll once both seats are filled.
    Begin,

    Roll { token: ConnectionToken },

    /// `move <token> <start> <end>`; `bar` is accepted for a start of 0.
    Move { token: ConnectionToken, mv: Move },

    /// List the legal plays for a connection.
    Moves { token: ConnectionToken },

    Reset,

    /// Print the match as text.
    Show,

    /// Print the match as JSON.
    Json,

    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = tokens.split_first()?;

    match head {
        "isready" => Some(Command::IsReady),
        "begin" => Some(Command::Begin),
        "reset" => Some(Command::Reset),
        "show" => Some(Command::Show),
        "json" => Some(Command::Json),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(args),
        "join" => token_arg(head, args).map(|token| Command::Join { token }),
        "leave" => token_arg(head, args).map(|token| Command::Leave { token }),
        "roll" => token_arg(head, args).map(|token| Command::Roll { token }),
        "moves" => token_arg(head, args).map(|token| Command::Moves { token }),
        "move" => parse_move(args),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    if args.len() < 2 || args[0] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }
    let rest = &args[1..];

    let (name_parts, value_parts) = match rest.iter().position(|&t| t == "value") {
        Some(vi) => (&rest[..vi], Some(&rest[vi + 1..])),
        None => (rest, None),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    let value = value_parts
        .filter(|parts| !parts.is_empty())
        .map(|parts| parts.join(" "));

    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

fn token_arg(command: &str, args: &[&str]) -> Option<ConnectionToken> {
    match args {
        [token] => Some(ConnectionToken::from(*token)),
        _ => {
            warn!(command, "malformed command: expected '{command} <token>'");
            None
        }
    }
}

/// Parses `move <token> <start> <end>`.
fn parse_move(args: &[&str]) -> Option<Command> {
    let [token, start, end] = args else {
        warn!("malformed move: expected 'move <token> <start> <end>'");
        return None;
    };
    let start = match *start {
        "bar" => Some(BAR),
        s => s.parse::<u8>().ok(),
    };
    let (Some(start), Ok(end)) = (start, end.parse::<u8>()) else {
        warn!("malformed move: points must be numbers");
        return None;
    };
    Some(Command::Move {
        token: ConnectionToken::from(*token),
        mv: Move::new(start, end),
    })
}
