// End-to-end command scenarios against an in-memory database with scripted
// dice.

use std::sync::Arc;

use pokebot::catalog::Catalog;
use pokebot::command::Command;
use pokebot::db::Database;
use pokebot::dice::ScriptedDice;
use pokebot::game::{Game, GameError, PlayerRef, PlayerState};
use pokebot::reply::Reply;

// Scripted values: chance() succeeds at <= percent, so 1 always hits and
// 100 always misses for the 70% explore and 40% catch rolls.
const HIT: u32 = 1;
const MISS: u32 = 100;

// Indices into the default wild pool.
const POOCHYENA: u32 = 0;
const RALTS: u32 = 2;

async fn setup() -> (Game, Arc<ScriptedDice>) {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let dice = Arc::new(ScriptedDice::new(Vec::new()));
    let game = Game::new(Arc::new(db), Catalog::default(), dice.clone());
    (game, dice)
}

fn ash() -> PlayerRef {
    PlayerRef::new(1, "ash")
}

/// New player who picked Treecko (40 hp).
async fn with_treecko(game: &Game) {
    game.start(&ash()).await.unwrap();
    game.choose_starter(&ash(), 0).await.unwrap();
}

// ── Starter selection ────────────────────────────────────────────────

#[tokio::test]
async fn test_new_player_gets_three_starters() {
    let (game, _) = setup().await;

    let reply = game.start(&ash()).await.unwrap();
    let Reply::ChooseStarterPrompt { options } = reply else {
        panic!("expected starter prompt, got {reply:?}");
    };
    assert_eq!(options.len(), 3);
    let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Treecko", "Torchic", "Mudkip"]);
    assert_eq!(options[2].index, 2);
    assert!(game.sessions().is_choosing_starter(1));
    assert_eq!(game.player_state(1).await.unwrap(), PlayerState::NeedsStarter);
}

#[tokio::test]
async fn test_choose_starter_creates_level_five_creature() {
    let (game, _) = setup().await;
    game.start(&ash()).await.unwrap();

    let reply = game.choose_starter(&ash(), 1).await.unwrap();
    assert!(matches!(reply, Reply::StarterConfirmed { .. }));
    assert!(!game.sessions().is_choosing_starter(1));

    let team = game.db().list_team(1).await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].species, "Torchic");
    assert_eq!(team[0].level, 5);
    assert_eq!(team[0].hp, 45);
    assert_eq!(team[0].max_hp, 45);
    assert_eq!(team[0].xp, 0);
    assert_eq!(game.player_state(1).await.unwrap(), PlayerState::Active);
}

#[tokio::test]
async fn test_invalid_starter_does_not_touch_store() {
    let (game, _) = setup().await;

    let err = game.choose_starter(&ash(), 5).await.unwrap_err();
    assert!(matches!(err, GameError::InvalidChoice { index: 5, count: 3 }));
    assert!(game.db().get_player(1).await.unwrap().is_none());
    assert!(game.db().list_team(1).await.unwrap().is_empty());

    let reply = game
        .dispatch(&ash(), Command::ChooseStarter(5))
        .await
        .unwrap();
    assert_eq!(reply, Reply::InvalidChoice { index: 5, count: 3 });
}

#[tokio::test]
async fn test_start_with_team_welcomes_back() {
    let (game, _) = setup().await;
    with_treecko(&game).await;

    let reply = game.start(&PlayerRef::new(1, "ash_ketchum")).await.unwrap();
    assert_eq!(
        reply,
        Reply::WelcomeBack {
            display_name: "ash_ketchum".into(),
            team_size: 1,
        }
    );
    let stored = game.db().get_player(1).await.unwrap().unwrap();
    assert_eq!(stored.display_name, "ash_ketchum");
}

#[tokio::test]
async fn test_choose_starter_again_adds_another() {
    let (game, _) = setup().await;
    with_treecko(&game).await;
    game.choose_starter(&ash(), 2).await.unwrap();

    let team = game.db().list_team(1).await.unwrap();
    let names: Vec<&str> = team.iter().map(|c| c.species.as_str()).collect();
    assert_eq!(names, vec!["Treecko", "Mudkip"]);
}

#[tokio::test]
async fn test_cancel_closes_prompt() {
    let (game, _) = setup().await;
    assert_eq!(game.cancel(1), Reply::Cancelled { prompt_closed: false });

    game.start(&ash()).await.unwrap();
    assert_eq!(game.cancel(1), Reply::Cancelled { prompt_closed: true });
    assert!(!game.sessions().is_choosing_starter(1));
}

// ── Explore ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_explore_requires_team() {
    let (game, dice) = setup().await;
    assert!(matches!(game.explore(1).await, Err(GameError::NoTeam)));
    assert_eq!(dice.remaining(), 0);

    let reply = game.dispatch(&ash(), Command::Explore).await.unwrap();
    assert_eq!(reply, Reply::NoTeam);
}

#[tokio::test]
async fn test_explore_hit_and_miss() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, RALTS]);
    let reply = game.explore(1).await.unwrap();
    assert_eq!(
        reply,
        Reply::EncounterFound {
            species: "Ralts".into(),
            hp: 25,
            max_hp: 25,
        }
    );

    // A miss leaves the current encounter in place.
    dice.push([MISS]);
    assert_eq!(game.explore(1).await.unwrap(), Reply::NothingFound);
    assert_eq!(game.sessions().get_encounter(1).unwrap().species, "Ralts");

    // A new hit replaces it.
    dice.push([HIT, POOCHYENA]);
    game.explore(1).await.unwrap();
    assert_eq!(
        game.sessions().get_encounter(1).unwrap().species,
        "Poochyena"
    );
}

#[tokio::test]
async fn test_show_team() {
    let (game, _) = setup().await;
    assert_eq!(game.show_team(1).await.unwrap(), Reply::EmptyTeam);

    with_treecko(&game).await;
    let Reply::TeamListing { creatures } = game.show_team(1).await.unwrap() else {
        panic!("expected team listing");
    };
    assert_eq!(creatures.len(), 1);
    assert_eq!(creatures[0].species, "Treecko");
}

// ── Battle ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_battle_without_encounter_changes_nothing() {
    let (game, dice) = setup().await;

    assert!(matches!(
        game.battle_turn(1).await,
        Err(GameError::NoEncounter)
    ));
    assert_eq!(
        game.dispatch(&ash(), Command::Battle).await.unwrap(),
        Reply::NoEncounter { command: "battle" }
    );
    assert!(game.db().get_player(1).await.unwrap().is_none());
    assert_eq!(dice.remaining(), 0);

    with_treecko(&game).await;
    assert!(matches!(
        game.battle_turn(1).await,
        Err(GameError::NoEncounter)
    ));
    let team = game.db().list_team(1).await.unwrap();
    assert_eq!(team[0].hp, 40);
}

#[tokio::test]
async fn test_battle_defeat_clears_encounter() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, POOCHYENA]);
    game.explore(1).await.unwrap();

    dice.push([10, 40]);
    let reply = game.battle_turn(1).await.unwrap();
    let Reply::BattleDefeat { report } = reply else {
        panic!("expected defeat, got {reply:?}");
    };
    assert_eq!(report.player_damage, 10);
    assert_eq!(report.wild_hp, 20);
    assert_eq!(report.wild_damage, 40);
    assert_eq!(report.attacker_hp, 0);

    assert!(game.sessions().get_encounter(1).is_none());
    let team = game.db().list_team(1).await.unwrap();
    assert_eq!(team[0].hp, 0);
    assert_eq!(game.db().get_player(1).await.unwrap().unwrap().total_xp, 0);
}

#[tokio::test]
async fn test_battle_continue_then_victory() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, RALTS]);
    game.explore(1).await.unwrap();

    dice.push([15, 5]);
    let reply = game.battle_turn(1).await.unwrap();
    let Reply::BattleContinue { report } = reply else {
        panic!("expected continue, got {reply:?}");
    };
    assert_eq!(report.wild_hp, 10);
    assert_eq!(report.attacker_hp, 35);
    assert_eq!(game.sessions().get_encounter(1).unwrap().hp, 10);

    dice.push([15, 5]);
    let reply = game.battle_turn(1).await.unwrap();
    let Reply::BattleVictory {
        report,
        player_xp,
        creature,
        levels_gained,
        ..
    } = reply
    else {
        panic!("expected victory, got {reply:?}");
    };
    assert_eq!(report.wild_hp, 0);
    assert_eq!(player_xp, 50);
    assert_eq!(levels_gained, 0);
    assert_eq!(creature.xp, 30);
    assert_eq!(creature.hp, 30);

    assert!(game.sessions().get_encounter(1).is_none());
    assert_eq!(game.db().get_player(1).await.unwrap().unwrap().total_xp, 50);
    let stored = &game.db().list_team(1).await.unwrap()[0];
    assert_eq!(stored, &creature);
}

#[tokio::test]
async fn test_victory_level_up_restores_hp() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    let mut treecko = game.db().list_team(1).await.unwrap().remove(0);
    treecko.xp = 480;
    game.db().set_creature_level_state(&treecko).await.unwrap();

    dice.push([HIT, RALTS]);
    game.explore(1).await.unwrap();
    dice.push([15, 12, 15, 12]);
    game.battle_turn(1).await.unwrap();
    let reply = game.battle_turn(1).await.unwrap();

    let Reply::BattleVictory {
        creature,
        levels_gained,
        ..
    } = reply
    else {
        panic!("expected victory, got {reply:?}");
    };
    assert_eq!(levels_gained, 1);
    assert_eq!(creature.level, 6);
    assert_eq!(creature.xp, 10);
    assert_eq!(creature.max_hp, 50);
    assert_eq!(creature.hp, 50);
}

#[tokio::test]
async fn test_fainted_creature_still_leads() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, POOCHYENA, 10, 40]);
    game.explore(1).await.unwrap();
    game.battle_turn(1).await.unwrap();

    dice.push([HIT, RALTS, 8, 5]);
    game.explore(1).await.unwrap();
    let reply = game.battle_turn(1).await.unwrap();
    let Reply::BattleDefeat { report } = reply else {
        panic!("expected defeat, got {reply:?}");
    };
    assert_eq!(report.attacker, "Treecko");
    assert_eq!(report.attacker_hp, 0);
}

// ── Run and catch ────────────────────────────────────────────────────

#[tokio::test]
async fn test_run() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;
    assert_eq!(game.run(1), Reply::NothingToRunFrom);

    dice.push([HIT, RALTS]);
    game.explore(1).await.unwrap();
    assert_eq!(
        game.run(1),
        Reply::RanAway {
            species: "Ralts".into()
        }
    );
    assert!(game.sessions().get_encounter(1).is_none());
}

#[tokio::test]
async fn test_catch_without_encounter() {
    let (game, _) = setup().await;
    assert!(matches!(
        game.catch_attempt(1).await,
        Err(GameError::NoEncounter)
    ));
    assert_eq!(
        game.dispatch(&ash(), Command::Catch).await.unwrap(),
        Reply::NoEncounter { command: "catch" }
    );
}

#[tokio::test]
async fn test_catch_escape_keeps_encounter() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, RALTS, MISS]);
    game.explore(1).await.unwrap();
    assert_eq!(
        game.catch_attempt(1).await.unwrap(),
        Reply::Escaped {
            species: "Ralts".into()
        }
    );
    assert!(game.sessions().get_encounter(1).is_some());
    assert_eq!(game.db().list_team(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_caught_creature_has_full_hp() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    dice.push([HIT, POOCHYENA, 12, 5]);
    game.explore(1).await.unwrap();
    game.battle_turn(1).await.unwrap();
    assert_eq!(game.sessions().get_encounter(1).unwrap().hp, 18);

    dice.push([HIT]);
    let reply = game.catch_attempt(1).await.unwrap();
    let Reply::Caught { creature } = reply else {
        panic!("expected catch, got {reply:?}");
    };
    assert_eq!(creature.species, "Poochyena");
    assert_eq!(creature.hp, 30);
    assert_eq!(creature.max_hp, 30);
    assert_eq!(creature.level, 5);

    assert!(game.sessions().get_encounter(1).is_none());
    let team = game.db().list_team(1).await.unwrap();
    assert_eq!(team.len(), 2);
    assert_eq!(team[1], creature);
}

// ── Leaderboard ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_leaderboard() {
    let (game, _) = setup().await;
    assert_eq!(game.leaderboard().await.unwrap(), Reply::LeaderboardEmpty);

    for (id, name, xp) in [(1, "ash", 50), (2, "misty", 150), (3, "brock", 100)] {
        game.start(&PlayerRef::new(id, name)).await.unwrap();
        game.db().add_player_xp(id, xp).await.unwrap();
    }

    let Reply::LeaderboardRows { rows } = game.leaderboard().await.unwrap() else {
        panic!("expected rows");
    };
    let order: Vec<(&str, i64)> = rows
        .iter()
        .map(|r| (r.display_name.as_str(), r.total_xp))
        .collect();
    assert_eq!(order, vec![("misty", 150), ("brock", 100), ("ash", 50)]);
}

#[tokio::test]
async fn test_leaderboard_limit() {
    let db = Database::new("sqlite::memory:").await.unwrap();
    let game = Game::new(
        Arc::new(db),
        Catalog::default(),
        Arc::new(ScriptedDice::new(Vec::new())),
    )
    .with_leaderboard_limit(2);

    for id in 1..=4 {
        game.start(&PlayerRef::new(id, &format!("p{id}"))).await.unwrap();
    }
    let Reply::LeaderboardRows { rows } = game.leaderboard().await.unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 2);
}

// ── Invariants ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_hp_stays_in_bounds_over_many_turns() {
    let (game, dice) = setup().await;
    with_treecko(&game).await;

    let mut last_level = 5;
    let mut last_max = 40;
    for round in 0..30u32 {
        dice.push([HIT, round % 4, 8 + round % 8, 5 + round % 8]);
        game.explore(1).await.unwrap();
        game.battle_turn(1).await.unwrap();
        game.run(1);

        for c in game.db().list_team(1).await.unwrap() {
            assert!(c.hp <= c.max_hp);
            assert!(c.level >= last_level);
            assert!(c.max_hp >= last_max);
            last_level = c.level;
            last_max = c.max_hp;
        }
    }
}
