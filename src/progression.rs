// Experience and level-up rules for owned creatures.
//
// Pure functions; persistence of the result is the caller's job.

use crate::db::Creature;
use crate::rules::{HP_PER_LEVEL, XP_PER_LEVEL};

/// XP required to advance from `level` to `level + 1`.
pub fn level_up_threshold(level: u32) -> u32 {
    XP_PER_LEVEL * level
}

/// Add `xp_gained` to the creature and apply every level-up it pays for.
///
/// Each level-up subtracts the threshold of the level being left, then
/// raises the level by one, adds [`HP_PER_LEVEL`] to max hp, and fully heals.
/// With no level-up the hp fields are left untouched.
pub fn apply_xp_gain(creature: &Creature, xp_gained: u32) -> Creature {
    let mut updated = creature.clone();
    updated.xp = updated.xp.saturating_add(xp_gained);

    while updated.xp >= level_up_threshold(updated.level) {
        updated.xp -= level_up_threshold(updated.level);
        updated.level += 1;
        updated.max_hp += HP_PER_LEVEL;
        updated.hp = updated.max_hp;
    }

    updated
}

/// Number of levels gained between two snapshots of the same creature.
pub fn levels_gained(before: &Creature, after: &Creature) -> u32 {
    after.level.saturating_sub(before.level)
}
