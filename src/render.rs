// Plain-text chat rendering of reply descriptors.

use std::fmt::Write;

use crate::reply::{BattleReport, Reply};

pub fn render(reply: &Reply) -> String {
    match reply {
        Reply::WelcomeBack { display_name, .. } => format!(
            "Welcome back, {display_name}! Use /explore to find wild Pokémon, /team to see your Pokémon, /leaderboard to see top trainers."
        ),
        Reply::ChooseStarterPrompt { options } => {
            let mut text = String::from("Welcome Trainer! Choose your starter Pokémon:\n");
            for option in options {
                let _ = writeln!(text, "/starter_{} {} (HP {})", option.index, option.name, option.hp);
            }
            text
        }
        Reply::StarterConfirmed { creature } => format!(
            "You chose {} as your starter! Your adventure begins.\nUse /explore to find wild Pokémon.",
            creature.species
        ),
        Reply::EncounterFound { species, .. } => {
            format!("A wild {species} appeared! Use /battle to fight, /catch to throw a Pokéball or /run to escape.")
        }
        Reply::NothingFound => "You explored but found nothing this time.".to_string(),
        Reply::TeamListing { creatures } => {
            let mut text = String::from("Your Pokémon Team:\n");
            for (i, c) in creatures.iter().enumerate() {
                let _ = writeln!(
                    text,
                    "{}. {} Lv.{} HP:{}/{} XP:{}",
                    i + 1,
                    c.species,
                    c.level,
                    c.hp,
                    c.max_hp,
                    c.xp
                );
            }
            text
        }
        Reply::EmptyTeam => {
            "You have no Pokémon yet. Use /start to begin your adventure.".to_string()
        }
        Reply::BattleContinue { report } => format!(
            "{}\n\nUse /battle to attack again or /run to flee.",
            battle_lines(report)
        ),
        Reply::BattleVictory {
            report,
            player_xp,
            creature,
            levels_gained,
            ..
        } => {
            let mut text = format!(
                "{}\n\nWild {} fainted! You gained {player_xp} XP.",
                battle_lines(report),
                report.wild_species
            );
            if *levels_gained > 0 {
                let _ = write!(
                    text,
                    " Your {} grew to Lv.{}!",
                    creature.species, creature.level
                );
            }
            text.push_str(" Use /explore to find more Pokémon.");
            text
        }
        Reply::BattleDefeat { report } => format!(
            "{}\n\nYour {} fainted! You lost the battle. Use /explore to try again.",
            battle_lines(report),
            report.attacker
        ),
        Reply::NoEncounter { command } => match *command {
            "catch" => "No wild Pokémon to catch. Use /explore to find some.".to_string(),
            "battle" => "No wild Pokémon to battle. Use /explore to find some!".to_string(),
            _ => "No wild Pokémon here. Use /explore to find some!".to_string(),
        },
        Reply::NoTeam => "You need to pick a starter first! Use /start.".to_string(),
        Reply::RanAway { .. } => {
            "You ran away safely. Use /explore to look for other Pokémon.".to_string()
        }
        Reply::NothingToRunFrom => "No wild Pokémon to run from.".to_string(),
        Reply::Caught { creature } => format!(
            "Congratulations! You caught a wild {}! Use /team to see your Pokémon.",
            creature.species
        ),
        Reply::Escaped { species } => format!(
            "Oh no! The wild {species} escaped your Pokéball! Use /battle to continue fighting or /run to flee."
        ),
        Reply::LeaderboardRows { rows } => {
            let mut text = String::from("🏆 Leaderboard - Total XP Gained 🏆\n\n");
            for (i, row) in rows.iter().enumerate() {
                let _ = writeln!(text, "{}. {}: {} XP", i + 1, row.display_name, row.total_xp);
            }
            text
        }
        Reply::LeaderboardEmpty => "Leaderboard is empty!".to_string(),
        Reply::InvalidChoice { count, .. } => format!(
            "That starter doesn't exist. Pick a number from 0 to {}.",
            count.saturating_sub(1)
        ),
        Reply::Cancelled { .. } => "Operation cancelled.".to_string(),
    }
}

fn battle_lines(report: &BattleReport) -> String {
    format!(
        "Your {attacker} dealt {pd} damage to wild {wild}.\n\
         Wild {wild} HP: {whp}/{wmax}\n\
         Wild {wild} dealt {wd} damage back.\n\
         Your {attacker} HP: {ahp}/{amax}",
        attacker = report.attacker,
        pd = report.player_damage,
        wild = report.wild_species,
        whp = report.wild_hp,
        wmax = report.wild_max_hp,
        wd = report.wild_damage,
        ahp = report.attacker_hp,
        amax = report.attacker_max_hp,
    )
}
