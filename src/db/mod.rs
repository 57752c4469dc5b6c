// Database access layer (SQLite via sqlx).

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::rules::STARTING_LEVEL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,
    pub display_name: String,
    pub total_xp: i64,
}

/// An owned creature. `species` is copied from the catalog at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creature {
    pub id: i64,
    pub owner_id: i64,
    pub species: String,
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub xp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub display_name: String,
    pub total_xp: i64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player {0} does not exist")]
    UnknownPlayer(i64),

    #[error("creature {0} not found")]
    CreatureNotFound(i64),

    #[error("xp award must be non-negative, got {0}")]
    NegativeXp(i64),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

const CREATURE_COLUMNS: &str = "id, owner_id, species, level, hp, max_hp, xp";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                total_xp INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS creatures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES players(id),
                species TEXT NOT NULL,
                level INTEGER NOT NULL DEFAULT 5,
                hp INTEGER NOT NULL,
                max_hp INTEGER NOT NULL,
                xp INTEGER NOT NULL DEFAULT 0,
                CHECK (hp >= 0 AND hp <= max_hp)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_creatures_owner ON creatures(owner_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ── Players ───────────────────────────────────────────────────────

    /// Fetch a player, inserting a fresh row with zero XP if absent.
    /// An existing row keeps its stored display name.
    pub async fn get_or_create_player(&self, id: i64, display_name: &str) -> Result<Player> {
        sqlx::query("INSERT INTO players (id, display_name) VALUES (?, ?) ON CONFLICT(id) DO NOTHING")
            .bind(id)
            .bind(display_name)
            .execute(&self.pool)
            .await?;

        let player = sqlx::query_as::<_, Player>(
            "SELECT id, display_name, total_xp FROM players WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn get_player(&self, id: i64) -> Result<Option<Player>> {
        let row = sqlx::query_as::<_, Player>(
            "SELECT id, display_name, total_xp FROM players WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_display_name(&self, id: i64, display_name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE players SET display_name = ? WHERE id = ?")
            .bind(display_name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownPlayer(id));
        }
        Ok(())
    }

    pub async fn add_player_xp(&self, id: i64, amount: i64) -> Result<()> {
        if amount < 0 {
            return Err(StoreError::NegativeXp(amount));
        }
        let result = sqlx::query("UPDATE players SET total_xp = total_xp + ? WHERE id = ?")
            .bind(amount)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownPlayer(id));
        }
        Ok(())
    }

    /// Highest total XP first. Ties are ordered by player id.
    pub async fn top_players_by_xp(&self, limit: u32) -> Result<Vec<LeaderboardRow>> {
        let rows = sqlx::query_as::<_, LeaderboardRow>(
            "SELECT display_name, total_xp FROM players ORDER BY total_xp DESC, id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ── Creatures ─────────────────────────────────────────────────────

    /// Insert a level-5 creature at full hp for an existing player.
    pub async fn add_creature(&self, owner_id: i64, species: &str, hp: u32) -> Result<Creature> {
        let row = sqlx::query_as::<_, Creature>(&format!(
            "INSERT INTO creatures (owner_id, species, level, hp, max_hp, xp) \
             SELECT ?, ?, ?, ?, ?, 0 WHERE EXISTS (SELECT 1 FROM players WHERE id = ?) \
             RETURNING {CREATURE_COLUMNS}"
        ))
        .bind(owner_id)
        .bind(species)
        .bind(STARTING_LEVEL)
        .bind(hp)
        .bind(hp)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::UnknownPlayer(owner_id))
    }

    /// The player's creatures in the order they were obtained.
    pub async fn list_team(&self, owner_id: i64) -> Result<Vec<Creature>> {
        let rows = sqlx::query_as::<_, Creature>(&format!(
            "SELECT {CREATURE_COLUMNS} FROM creatures WHERE owner_id = ? ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_creature(&self, id: i64) -> Result<Option<Creature>> {
        let row = sqlx::query_as::<_, Creature>(&format!(
            "SELECT {CREATURE_COLUMNS} FROM creatures WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Set current hp, clamped to the creature's max hp.
    pub async fn set_creature_hp(&self, id: i64, hp: u32) -> Result<()> {
        let result = sqlx::query("UPDATE creatures SET hp = MIN(?, max_hp) WHERE id = ?")
            .bind(hp)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::CreatureNotFound(id));
        }
        Ok(())
    }

    /// Write level, xp, and both hp fields in one statement.
    pub async fn set_creature_level_state(&self, creature: &Creature) -> Result<()> {
        let result = sqlx::query(
            "UPDATE creatures SET level = ?, xp = ?, max_hp = ?, hp = ? WHERE id = ?",
        )
        .bind(creature.level)
        .bind(creature.xp)
        .bind(creature.max_hp)
        .bind(creature.hp)
        .bind(creature.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::CreatureNotFound(creature.id));
        }
        Ok(())
    }

    /// Run an arbitrary statement; lets tests break the schema to exercise
    /// store failure paths.
    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &str) -> Result<()> {
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }
}
