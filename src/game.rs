// Command processor: runs one player command against the store and the
// session map and returns a reply descriptor.
//
// Commands for the same player must not run concurrently; the caller
// serializes them. Different players are independent.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::catalog::Catalog;
use crate::command::Command;
use crate::db::{Database, StoreError};
use crate::dice::Dice;
use crate::metrics;
use crate::progression::{apply_xp_gain, levels_gained};
use crate::reply::{BattleReport, Reply, StarterOption};
use crate::rules::*;
use crate::session::Sessions;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("player has no creatures")]
    NoTeam,

    #[error("no active wild encounter")]
    NoEncounter,

    #[error("starter index {index} out of range (0..{count})")]
    InvalidChoice { index: usize, count: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Identity of the player issuing a command, as supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub id: i64,
    pub display_name: String,
}

impl PlayerRef {
    pub fn new(id: i64, display_name: &str) -> Self {
        Self {
            id,
            display_name: display_name.to_string(),
        }
    }

    /// Name written when the player row is first created. Transports that
    /// don't know the user's name send an empty one.
    fn registration_name(&self) -> String {
        if self.display_name.is_empty() {
            format!("trainer{}", self.id)
        } else {
            self.display_name.clone()
        }
    }
}

/// Whether the player still has to pick a starter. Once `Active`, a player
/// never goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    NeedsStarter,
    Active,
}

pub struct Game {
    db: Arc<Database>,
    catalog: Catalog,
    sessions: Sessions,
    dice: Arc<dyn Dice>,
    leaderboard_limit: u32,
}

impl Game {
    pub fn new(db: Arc<Database>, catalog: Catalog, dice: Arc<dyn Dice>) -> Self {
        Self {
            db,
            catalog,
            sessions: Sessions::new(),
            dice,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    pub fn with_leaderboard_limit(mut self, limit: u32) -> Self {
        self.leaderboard_limit = limit;
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    /// Run a parsed command. User-facing failures come back as replies
    /// (`NoTeam`, `NoEncounter`, `InvalidChoice`); only store failures are
    /// returned as errors.
    pub async fn dispatch(
        &self,
        player: &PlayerRef,
        command: Command,
    ) -> std::result::Result<Reply, StoreError> {
        let name = command.name();
        let started = Instant::now();
        metrics::COMMANDS_TOTAL.with_label_values(&[name]).inc();

        let result = match command {
            Command::Start => self.start(player).await,
            Command::ChooseStarter(index) => self.choose_starter(player, index).await,
            Command::Explore => self.explore(player.id).await,
            Command::Team => self.show_team(player.id).await,
            Command::Battle => self.battle_turn(player.id).await,
            Command::Run => Ok(self.run(player.id)),
            Command::Catch => self.catch_attempt(player.id).await,
            Command::Leaderboard => self.leaderboard().await,
            Command::Cancel => Ok(self.cancel(player.id)),
        };

        metrics::COMMAND_DURATION_SECONDS
            .with_label_values(&[name])
            .observe(started.elapsed().as_secs_f64());

        match result {
            Ok(reply) => Ok(reply),
            Err(GameError::NoTeam) => Ok(Reply::NoTeam),
            Err(GameError::NoEncounter) => Ok(Reply::NoEncounter { command: name }),
            Err(GameError::InvalidChoice { index, count }) => {
                Ok(Reply::InvalidChoice { index, count })
            }
            Err(GameError::Store(e)) => {
                metrics::COMMAND_FAILURES_TOTAL.with_label_values(&[name]).inc();
                tracing::error!(player_id = player.id, command = name, "Store failure: {e}");
                Err(e)
            }
        }
    }

    pub async fn player_state(&self, player_id: i64) -> Result<PlayerState> {
        let team = self.db.list_team(player_id).await?;
        Ok(if team.is_empty() {
            PlayerState::NeedsStarter
        } else {
            PlayerState::Active
        })
    }

    // ── Commands ──────────────────────────────────────────────────────

    /// Register the player if new. Players without a team get the starter
    /// prompt; everyone else is welcomed back.
    ///
    /// A non-empty name that differs from the stored one replaces it; an
    /// empty name keeps whatever is stored.
    pub async fn start(&self, player: &PlayerRef) -> Result<Reply> {
        let mut stored = self
            .db
            .get_or_create_player(player.id, &player.registration_name())
            .await?;
        if !player.display_name.is_empty() && stored.display_name != player.display_name {
            self.db
                .update_display_name(player.id, &player.display_name)
                .await?;
            stored.display_name = player.display_name.clone();
        }

        let team = self.db.list_team(player.id).await?;
        if !team.is_empty() {
            return Ok(Reply::WelcomeBack {
                display_name: stored.display_name,
                team_size: team.len(),
            });
        }

        self.sessions.open_starter_prompt(player.id);
        tracing::info!(player_id = player.id, "Offering starter choice");
        let options = self
            .catalog
            .starters
            .iter()
            .enumerate()
            .map(|(index, species)| StarterOption::new(index, species))
            .collect();
        Ok(Reply::ChooseStarterPrompt { options })
    }

    /// Give the player the starter at `index`. Does not require an open
    /// prompt and does not refuse players who already have a team.
    pub async fn choose_starter(&self, player: &PlayerRef, index: usize) -> Result<Reply> {
        let species = self
            .catalog
            .starter(index)
            .ok_or(GameError::InvalidChoice {
                index,
                count: self.catalog.starters.len(),
            })?;

        self.db
            .get_or_create_player(player.id, &player.registration_name())
            .await?;
        let creature = self
            .db
            .add_creature(player.id, &species.name, species.hp)
            .await?;
        self.sessions.close_starter_prompt(player.id);

        tracing::info!(player_id = player.id, species = %creature.species, "Starter chosen");
        Ok(Reply::StarterConfirmed { creature })
    }

    /// Roll for a wild encounter. A miss leaves any existing encounter alone.
    pub async fn explore(&self, player_id: i64) -> Result<Reply> {
        let team = self.db.list_team(player_id).await?;
        if team.is_empty() {
            return Err(GameError::NoTeam);
        }

        if self.catalog.wild.is_empty() {
            tracing::warn!(player_id, "Wild pool is empty, nothing to encounter");
            return Ok(Reply::NothingFound);
        }

        if !self.dice.chance(EXPLORE_ENCOUNTER_CHANCE, "explore encounter") {
            return Ok(Reply::NothingFound);
        }

        let pick = self.dice.pick(self.catalog.wild.len(), "wild species");
        let species = &self.catalog.wild[pick];
        let encounter = self.sessions.start_encounter(player_id, species);
        metrics::ENCOUNTERS_STARTED_TOTAL.inc();
        tracing::info!(player_id, species = %encounter.species, "Wild encounter started");

        Ok(Reply::EncounterFound {
            species: encounter.species,
            hp: encounter.max_hp,
            max_hp: encounter.max_hp,
        })
    }

    pub async fn show_team(&self, player_id: i64) -> Result<Reply> {
        let creatures = self.db.list_team(player_id).await?;
        if creatures.is_empty() {
            return Ok(Reply::EmptyTeam);
        }
        Ok(Reply::TeamListing { creatures })
    }

    /// One exchange of attacks between the player's first creature and the
    /// wild encounter.
    ///
    /// The first creature fights even at 0 hp; fainting is not tracked.
    ///
    /// The creature's hp is written before the encounter takes damage, so a
    /// failed write leaves the encounter as it was.
    pub async fn battle_turn(&self, player_id: i64) -> Result<Reply> {
        if self.sessions.get_encounter(player_id).is_none() {
            return Err(GameError::NoEncounter);
        }
        let team = self.db.list_team(player_id).await?;
        let active = team.into_iter().next().ok_or(GameError::NoTeam)?;

        let player_damage = self
            .dice
            .roll(PLAYER_DAMAGE_MIN, PLAYER_DAMAGE_MAX, "player damage");
        let wild_damage = self
            .dice
            .roll(WILD_DAMAGE_MIN, WILD_DAMAGE_MAX, "wild damage");
        let new_hp = active.hp.saturating_sub(wild_damage);
        self.db.set_creature_hp(active.id, new_hp).await?;

        let wild = self
            .sessions
            .damage_encounter(player_id, player_damage)
            .ok_or(GameError::NoEncounter)?;

        tracing::debug!(
            player_id,
            creature_id = active.id,
            player_damage,
            wild_damage,
            wild_hp = wild.hp,
            creature_hp = new_hp,
            "Battle turn"
        );

        let report = BattleReport {
            attacker: active.species.clone(),
            player_damage,
            wild_species: wild.species.clone(),
            wild_hp: wild.display_hp(),
            wild_max_hp: wild.max_hp,
            wild_damage,
            attacker_hp: new_hp,
            attacker_max_hp: active.max_hp,
        };

        if wild.is_fainted() {
            self.db
                .add_player_xp(player_id, i64::from(VICTORY_PLAYER_XP))
                .await?;

            let mut wounded = active;
            wounded.hp = new_hp;
            let creature = apply_xp_gain(&wounded, VICTORY_CREATURE_XP);
            self.db.set_creature_level_state(&creature).await?;
            let levels = levels_gained(&wounded, &creature);
            if levels > 0 {
                metrics::LEVEL_UPS_TOTAL.inc_by(u64::from(levels));
                tracing::info!(
                    player_id,
                    creature_id = creature.id,
                    level = creature.level,
                    "Creature leveled up"
                );
            }

            self.sessions.clear_encounter(player_id);
            metrics::BATTLE_TURNS_TOTAL
                .with_label_values(&["victory"])
                .inc();
            tracing::info!(player_id, species = %wild.species, "Wild creature fainted");

            return Ok(Reply::BattleVictory {
                report,
                player_xp: VICTORY_PLAYER_XP,
                creature_xp: VICTORY_CREATURE_XP,
                creature,
                levels_gained: levels,
            });
        }

        if new_hp == 0 {
            self.sessions.clear_encounter(player_id);
            metrics::BATTLE_TURNS_TOTAL.with_label_values(&["defeat"]).inc();
            tracing::info!(player_id, creature_id = active.id, "Player creature fainted");
            return Ok(Reply::BattleDefeat { report });
        }

        metrics::BATTLE_TURNS_TOTAL
            .with_label_values(&["continue"])
            .inc();
        Ok(Reply::BattleContinue { report })
    }

    pub fn run(&self, player_id: i64) -> Reply {
        match self.sessions.clear_encounter(player_id) {
            Some(encounter) => Reply::RanAway {
                species: encounter.species,
            },
            None => Reply::NothingToRunFrom,
        }
    }

    /// Throw a ball at the wild encounter. A caught creature joins the team
    /// at full max hp, whatever damage it took in battle.
    pub async fn catch_attempt(&self, player_id: i64) -> Result<Reply> {
        let encounter = self
            .sessions
            .get_encounter(player_id)
            .ok_or(GameError::NoEncounter)?;

        if !self.dice.chance(CATCH_CHANCE, "catch") {
            metrics::CATCH_ATTEMPTS_TOTAL
                .with_label_values(&["escaped"])
                .inc();
            return Ok(Reply::Escaped {
                species: encounter.species,
            });
        }

        let creature = self
            .db
            .add_creature(player_id, &encounter.species, encounter.max_hp)
            .await?;
        self.sessions.clear_encounter(player_id);
        metrics::CATCH_ATTEMPTS_TOTAL
            .with_label_values(&["caught"])
            .inc();
        tracing::info!(player_id, species = %creature.species, "Wild creature caught");

        Ok(Reply::Caught { creature })
    }

    pub async fn leaderboard(&self) -> Result<Reply> {
        let rows = self.db.top_players_by_xp(self.leaderboard_limit).await?;
        if rows.is_empty() {
            return Ok(Reply::LeaderboardEmpty);
        }
        Ok(Reply::LeaderboardRows { rows })
    }

    pub fn cancel(&self, player_id: i64) -> Reply {
        Reply::Cancelled {
            prompt_closed: self.sessions.close_starter_prompt(player_id),
        }
    }
}
