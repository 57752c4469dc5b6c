// Result descriptors returned by the game core for the transport to render.

use serde::Serialize;

use crate::catalog::Species;
use crate::db::{Creature, LeaderboardRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StarterOption {
    pub index: usize,
    pub name: String,
    pub hp: u32,
}

impl StarterOption {
    pub fn new(index: usize, species: &Species) -> Self {
        Self {
            index,
            name: species.name.clone(),
            hp: species.hp,
        }
    }
}

/// One exchange of blows: the player's lead creature hits the wild one,
/// then the wild one hits back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleReport {
    pub attacker: String,
    pub player_damage: u32,
    pub wild_species: String,
    pub wild_hp: u32,
    pub wild_max_hp: u32,
    pub wild_damage: u32,
    pub attacker_hp: u32,
    pub attacker_max_hp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    WelcomeBack {
        display_name: String,
        team_size: usize,
    },
    ChooseStarterPrompt {
        options: Vec<StarterOption>,
    },
    StarterConfirmed {
        creature: Creature,
    },
    EncounterFound {
        species: String,
        hp: u32,
        max_hp: u32,
    },
    NothingFound,
    TeamListing {
        creatures: Vec<Creature>,
    },
    EmptyTeam,
    BattleContinue {
        report: BattleReport,
    },
    BattleVictory {
        report: BattleReport,
        player_xp: u32,
        creature_xp: u32,
        creature: Creature,
        levels_gained: u32,
    },
    BattleDefeat {
        report: BattleReport,
    },
    /// `command` is the command that needed an encounter (`battle` or
    /// `catch`).
    NoEncounter {
        command: &'static str,
    },
    NoTeam,
    RanAway {
        species: String,
    },
    NothingToRunFrom,
    Caught {
        creature: Creature,
    },
    Escaped {
        species: String,
    },
    LeaderboardRows {
        rows: Vec<LeaderboardRow>,
    },
    LeaderboardEmpty,
    InvalidChoice {
        index: usize,
        count: usize,
    },
    Cancelled {
        prompt_closed: bool,
    },
}

impl Reply {
    /// Snake-case tag, matching the serialized `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Reply::WelcomeBack { .. } => "welcome_back",
            Reply::ChooseStarterPrompt { .. } => "choose_starter_prompt",
            Reply::StarterConfirmed { .. } => "starter_confirmed",
            Reply::EncounterFound { .. } => "encounter_found",
            Reply::NothingFound => "nothing_found",
            Reply::TeamListing { .. } => "team_listing",
            Reply::EmptyTeam => "empty_team",
            Reply::BattleContinue { .. } => "battle_continue",
            Reply::BattleVictory { .. } => "battle_victory",
            Reply::BattleDefeat { .. } => "battle_defeat",
            Reply::NoEncounter { .. } => "no_encounter",
            Reply::NoTeam => "no_team",
            Reply::RanAway { .. } => "ran_away",
            Reply::NothingToRunFrom => "nothing_to_run_from",
            Reply::Caught { .. } => "caught",
            Reply::Escaped { .. } => "escaped",
            Reply::LeaderboardRows { .. } => "leaderboard_rows",
            Reply::LeaderboardEmpty => "leaderboard_empty",
            Reply::InvalidChoice { .. } => "invalid_choice",
            Reply::Cancelled { .. } => "cancelled",
        }
    }
}
