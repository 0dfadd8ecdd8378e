//! Command loop for the headless host
//!
//! Each input line is one command:
//!
//! ```text
//! step [n]           advance n frames (default 1)
//! swing <strength>   swing the club, negative strength swings back
//! move <actor> x y z translate a named actor
//! reset              put the resettable actors back
//! status             win state and displacement telemetry
//! help               list commands
//! exit               leave the loop
//! ```

use putt_level::{LevelResult, MiniGolf};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (try 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Step(u32),
    Swing(f32),
    Move { actor: String, delta: [f32; 3] },
    Reset,
    Status,
    Help,
    Exit,
}

/// Result of running a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Keep reading commands; the text is printed
    Continue(String),
    Exit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Empty);
        };
        let args: Vec<&str> = words.collect();

        match (name.to_lowercase().as_str(), args.as_slice()) {
            ("step" | "s", []) => Ok(Self::Step(1)),
            ("step" | "s", [n]) => n
                .parse()
                .map(Self::Step)
                .map_err(|_| CommandError::Usage("step [frames]")),
            ("swing", [strength]) => strength
                .parse()
                .map(Self::Swing)
                .map_err(|_| CommandError::Usage("swing <strength>")),
            ("move", [actor, x, y, z]) => {
                let parse = |v: &str| {
                    v.parse::<f32>()
                        .map_err(|_| CommandError::Usage("move <actor> <x> <y> <z>"))
                };
                Ok(Self::Move {
                    actor: actor.to_string(),
                    delta: [parse(*x)?, parse(*y)?, parse(*z)?],
                })
            }
            ("reset", []) => Ok(Self::Reset),
            ("status", []) => Ok(Self::Status),
            ("help" | "?", []) => Ok(Self::Help),
            ("exit" | "quit" | "q", []) => Ok(Self::Exit),
            ("step" | "s", _) => Err(CommandError::Usage("step [frames]")),
            ("swing", _) => Err(CommandError::Usage("swing <strength>")),
            ("move", _) => Err(CommandError::Usage("move <actor> <x> <y> <z>")),
            (other, _) => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// Run the command against the session, stepping by `dt` per frame
    pub fn execute(&self, game: &mut MiniGolf, dt: f32) -> LevelResult<Reply> {
        let text = match self {
            Self::Step(frames) => {
                let mut substeps = 0;
                for _ in 0..*frames {
                    substeps += game.step(dt)?;
                }
                let mut text = format!("{frames} frame(s), {substeps} physics step(s)");
                if game.is_won() {
                    text.push_str(" - won");
                }
                text
            }
            Self::Swing(strength) => {
                game.swing(*strength)?;
                format!("Swing {strength}")
            }
            Self::Move { actor, delta } => {
                game.translate(actor, *delta)?;
                format!("Moved {actor} by ({}, {}, {})", delta[0], delta[1], delta[2])
            }
            Self::Reset => {
                game.reset()?;
                "Level reset".to_string()
            }
            Self::Status => status_report(game)?,
            Self::Help => HELP.to_string(),
            Self::Exit => return Ok(Reply::Exit),
        };
        Ok(Reply::Continue(text))
    }
}

const HELP: &str = "\
Commands:
  step [n]            advance n frames (default 1)
  swing <strength>    swing the club (negative swings back)
  move <actor> x y z  translate a named actor
  reset               put the ball, club and sails back
  status              win state and displacements
  help                this list
  exit                quit";

/// Win state plus the displacement of every telemetry actor
pub fn status_report(game: &MiniGolf) -> LevelResult<String> {
    let mut report = String::new();
    let state = if game.is_won() { "WON" } else { "in play" };
    let _ = writeln!(report, "Status: {state}");

    let ball = game.position(putt_level::names::BALL)?;
    let _ = writeln!(
        report,
        "Ball at ({:.3}, {:.3}, {:.3})",
        ball[0], ball[1], ball[2]
    );

    for (name, displacement) in game.displacements()? {
        let _ = writeln!(report, "  {name:<10} moved {displacement:.4}");
    }
    Ok(report.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use putt_level::names;

    fn game() -> MiniGolf {
        let mut game = MiniGolf::standard().unwrap();
        game.initialize().unwrap();
        game
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("step".parse::<Command>(), Ok(Command::Step(1)));
        assert_eq!("step 30".parse::<Command>(), Ok(Command::Step(30)));
        assert_eq!("  SWING  -2.5 ".parse::<Command>(), Ok(Command::Swing(-2.5)));
        assert_eq!(
            "move club_pivot 1 0 -0.5".parse::<Command>(),
            Ok(Command::Move {
                actor: "club_pivot".to_string(),
                delta: [1.0, 0.0, -0.5],
            })
        );
        assert_eq!("reset".parse::<Command>(), Ok(Command::Reset));
        assert_eq!("status".parse::<Command>(), Ok(Command::Status));
        assert_eq!("?".parse::<Command>(), Ok(Command::Help));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Exit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("   ".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(CommandError::Unknown("jump".to_string()))
        );
        assert!(matches!("step x".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("swing".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("move ball 1 2".parse::<Command>(), Err(CommandError::Usage(_))));
        assert!(matches!("reset now".parse::<Command>(), Err(CommandError::Unknown(_))));
    }

    #[test]
    fn test_execute_step_and_exit() {
        let mut game = game();
        let reply = Command::Step(2).execute(&mut game, 1.0 / 60.0).unwrap();
        assert_eq!(reply, Reply::Continue("2 frame(s), 2 physics step(s)".to_string()));
        assert_eq!(Command::Exit.execute(&mut game, 1.0 / 60.0).unwrap(), Reply::Exit);
    }

    #[test]
    fn test_execute_move_unknown_actor() {
        let mut game = game();
        let cmd = Command::Move {
            actor: "nope".to_string(),
            delta: [0.0; 3],
        };
        assert!(cmd.execute(&mut game, 1.0 / 60.0).is_err());
    }

    #[test]
    fn test_status_lists_telemetry() {
        let game = game();
        let report = status_report(&game).unwrap();
        assert!(report.starts_with("Status: in play"));
        for name in [names::BALL, names::CLUB, names::SAILS, names::FLAG_POLE] {
            assert!(report.contains(name), "missing {name} in:\n{report}");
        }
    }
}
