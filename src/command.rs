// Player commands and their parsing from chat-style names.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    ChooseStarter(usize),
    Explore,
    Team,
    Battle,
    Run,
    Catch,
    Leaderboard,
    Cancel,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("command {0} needs a payload")]
    MissingPayload(&'static str),

    #[error("invalid payload for {command}: {payload}")]
    BadPayload {
        command: &'static str,
        payload: String,
    },
}

impl Command {
    /// Parse a command name such as `explore` or `/explore`.
    ///
    /// The starter choice is `starter` with the index as payload, or the
    /// inline-button form `starter_<index>`.
    pub fn parse(name: &str, payload: Option<&str>) -> Result<Self, ParseCommandError> {
        let name = name.trim().trim_start_matches('/').to_ascii_lowercase();

        if let Some(index) = name.strip_prefix("starter_") {
            return parse_index(index).map(Command::ChooseStarter);
        }

        let command = match name.as_str() {
            "start" => Command::Start,
            "starter" | "choose_starter" => {
                let payload = payload.ok_or(ParseCommandError::MissingPayload("starter"))?;
                Command::ChooseStarter(parse_index(payload)?)
            }
            "explore" => Command::Explore,
            "team" => Command::Team,
            "battle" => Command::Battle,
            "run" => Command::Run,
            "catch" => Command::Catch,
            "leaderboard" => Command::Leaderboard,
            "cancel" => Command::Cancel,
            _ => return Err(ParseCommandError::Unknown(name)),
        };
        Ok(command)
    }

    /// Stable name used for logs and metric labels.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::ChooseStarter(_) => "starter",
            Command::Explore => "explore",
            Command::Team => "team",
            Command::Battle => "battle",
            Command::Run => "run",
            Command::Catch => "catch",
            Command::Leaderboard => "leaderboard",
            Command::Cancel => "cancel",
        }
    }
}

fn parse_index(raw: &str) -> Result<usize, ParseCommandError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseCommandError::BadPayload {
            command: "starter",
            payload: raw.to_string(),
        })
}
