//! Parse input lines into commands

use statecell::Action;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Dispatch a typed action
    Dispatch(Action),
    /// Dispatch a raw JSON value, validated by the store
    Raw(Value),
    /// Print the current state
    Show,
    Help,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match word {
        "inc" | "+" => Ok(Command::Dispatch(Action::new("increment"))),
        "dec" | "-" => Ok(Command::Dispatch(Action::new("decrement"))),
        "reset" => Ok(Command::Dispatch(Action::new("reset"))),
        "set" => rest
            .parse::<i64>()
            .map(|value| Command::Dispatch(Action::new("set").with("value", value)))
            .map_err(|_| format!("set expects a number, got '{}'", rest)),
        "json" => serde_json::from_str(rest)
            .map(Command::Raw)
            .map_err(|e| format!("invalid JSON: {}", e)),
        "show" | "" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', try 'help'", other)),
    }
}

pub const HELP: &str = "\
commands:
  inc, +        increment the counter
  dec, -        decrement the counter
  reset         reset to the configured initial value
  set <n>       set the counter to n
  json <value>  dispatch a raw JSON action, e.g. json {\"type\": \"increment\"}
  show          print the current state
  quit          exit";
