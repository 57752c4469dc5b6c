// Game balance constants.

/// Level every new creature starts at, starter or caught.
pub const STARTING_LEVEL: u32 = 5;

/// XP per level needed to level up: threshold = XP_PER_LEVEL * level.
pub const XP_PER_LEVEL: u32 = 100;
pub const HP_PER_LEVEL: u32 = 10;

// Percent chances
pub const EXPLORE_ENCOUNTER_CHANCE: u8 = 70;
pub const CATCH_CHANCE: u8 = 40;

// Inclusive damage ranges per battle turn
pub const PLAYER_DAMAGE_MIN: u32 = 8;
pub const PLAYER_DAMAGE_MAX: u32 = 15;
pub const WILD_DAMAGE_MIN: u32 = 5;
pub const WILD_DAMAGE_MAX: u32 = 12;

// Victory rewards
pub const VICTORY_PLAYER_XP: u32 = 50;
pub const VICTORY_CREATURE_XP: u32 = 30;

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;
