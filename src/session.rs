// In-memory per-player session state: the active wild encounter and whether
// a starter prompt is open.
//
// Nothing here is persisted. A restart drops every in-progress encounter.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::catalog::Species;
use crate::metrics;

/// The wild creature a player is currently facing.
///
/// `hp` is signed because battle damage may push it below zero; render it
/// with [`Encounter::display_hp`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encounter {
    pub species: String,
    pub hp: i64,
    pub max_hp: u32,
}

impl Encounter {
    pub fn new(species: &Species) -> Self {
        Self {
            species: species.name.clone(),
            hp: i64::from(species.hp),
            max_hp: species.hp,
        }
    }

    pub fn display_hp(&self) -> u32 {
        self.hp.clamp(0, i64::from(self.max_hp)) as u32
    }

    pub fn is_fainted(&self) -> bool {
        self.hp <= 0
    }
}

#[derive(Debug, Default)]
struct Slots {
    encounters: HashMap<i64, Encounter>,
    choosing_starter: HashSet<i64>,
}

/// Thread-safe session map keyed by player id. One encounter slot per
/// player, last write wins.
#[derive(Debug, Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<Slots>>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start an encounter, replacing any existing one for this player.
    pub fn start_encounter(&self, player_id: i64, species: &Species) -> Encounter {
        let encounter = Encounter::new(species);
        let mut slots = self.lock();
        slots.encounters.insert(player_id, encounter.clone());
        metrics::ACTIVE_ENCOUNTERS.set(slots.encounters.len() as i64);
        encounter
    }

    pub fn get_encounter(&self, player_id: i64) -> Option<Encounter> {
        self.lock().encounters.get(&player_id).cloned()
    }

    /// Subtract `damage` from the active encounter and return its new state.
    pub fn damage_encounter(&self, player_id: i64, damage: u32) -> Option<Encounter> {
        let mut slots = self.lock();
        let encounter = slots.encounters.get_mut(&player_id)?;
        encounter.hp -= i64::from(damage);
        Some(encounter.clone())
    }

    /// Remove and return the player's encounter, if any.
    pub fn clear_encounter(&self, player_id: i64) -> Option<Encounter> {
        let mut slots = self.lock();
        let removed = slots.encounters.remove(&player_id);
        metrics::ACTIVE_ENCOUNTERS.set(slots.encounters.len() as i64);
        removed
    }

    pub fn active_encounters(&self) -> usize {
        self.lock().encounters.len()
    }

    // ── Starter prompt ────────────────────────────────────────────────

    pub fn open_starter_prompt(&self, player_id: i64) {
        self.lock().choosing_starter.insert(player_id);
    }

    /// Close the prompt. Returns whether one was open.
    pub fn close_starter_prompt(&self, player_id: i64) -> bool {
        self.lock().choosing_starter.remove(&player_id)
    }

    pub fn is_choosing_starter(&self, player_id: i64) -> bool {
        self.lock().choosing_starter.contains(&player_id)
    }
}
