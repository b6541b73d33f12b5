//! SQLite persistence for game timers and schedule presets
//!
//! Each game owns one `game_timers` row. Writers go through
//! [`TimerStore::update_timer`], which re-reads the row and swaps it in
//! only if its `version` and the owning game's status are unchanged, so
//! concurrent transitions on the same game serialize without any
//! cross-game locking.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, Pool, Sqlite,
};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, TimerError},
    schedule::{Preset, PresetBook, Schedule},
    state::GameStatus,
    timer::{TimerState, TimerStatus},
};

pub type DbPool = Pool<Sqlite>;

/// Attempts at a read-modify-write before giving up on a contended row
const MAX_SWAP_ATTEMPTS: usize = 8;

/// A timer record together with the row version and game status it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTimer {
    pub state: TimerState,
    pub version: i64,
    pub game_status: GameStatus,
}

#[derive(Debug, FromRow)]
struct TimerRow {
    status: String,
    started_at: Option<String>,
    paused_at: Option<String>,
    total_paused_seconds: i64,
    schedule: String,
    version: i64,
    game_status: String,
}

impl TimerRow {
    fn decode(self) -> Result<StoredTimer> {
        let status = TimerStatus::from_str(&self.status).map_err(TimerError::Corrupt)?;
        let game_status = GameStatus::from_str(&self.game_status).map_err(TimerError::Corrupt)?;
        let schedule: Schedule = serde_json::from_str(&self.schedule)
            .map_err(|e| TimerError::Corrupt(format!("schedule: {}", e)))?;

        let state = TimerState {
            status,
            started_at: parse_timestamp(self.started_at.as_deref())?,
            paused_at: parse_timestamp(self.paused_at.as_deref())?,
            total_paused_seconds: self.total_paused_seconds,
            schedule,
        };
        state.check_invariants().map_err(TimerError::Corrupt)?;

        Ok(StoredTimer {
            state,
            version: self.version,
            game_status,
        })
    }
}

#[derive(Debug, FromRow)]
struct PresetRow {
    name: String,
    levels: String,
}

impl PresetRow {
    fn decode(self) -> Result<Preset> {
        let levels: Schedule = serde_json::from_str(&self.levels)
            .map_err(|e| TimerError::Corrupt(format!("preset '{}': {}", self.name, e)))?;
        Ok(Preset::new(self.name, levels))
    }
}

fn parse_timestamp(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|e| TimerError::Corrupt(format!("timestamp '{}': {}", raw, e)))
        })
        .transpose()
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|at| at.to_rfc3339())
}

fn encode_schedule(schedule: &Schedule) -> Result<String> {
    serde_json::to_string(schedule).map_err(|e| TimerError::Corrupt(format!("schedule: {}", e)))
}

/// Storage for timers, the game statuses they depend on, and presets
#[derive(Debug, Clone)]
pub struct TimerStore {
    pool: DbPool,
}

impl TimerStore {
    /// Open (creating if needed) the database at `database_url` and migrate it
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database, used by tests.
    ///
    /// Pinned to a single connection because every SQLite memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        let migration_sql = include_str!("migrations/001_timer_schema.sql");
        sqlx::raw_sql(migration_sql).execute(&self.pool).await?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Record a game and its lifecycle status
    pub async fn upsert_game(&self, game_id: &str, status: GameStatus) -> Result<()> {
        sqlx::query(
            "INSERT INTO games (id, status) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET status = excluded.status",
        )
        .bind(game_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        debug!("Game {} status set to {}", game_id, status);
        Ok(())
    }

    /// Lifecycle status of a game, or `None` if the game is unknown
    pub async fn game_status(&self, game_id: &str) -> Result<Option<GameStatus>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT status FROM games WHERE id = ?")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(status,)| GameStatus::from_str(&status).map_err(TimerError::Corrupt))
            .transpose()
    }

    /// Load a game's timer row if one exists
    pub async fn load_timer(&self, game_id: &str) -> Result<Option<StoredTimer>> {
        let row: Option<TimerRow> = sqlx::query_as(
            "SELECT t.status, t.started_at, t.paused_at, t.total_paused_seconds, t.schedule,
                    t.version, g.status AS game_status
             FROM game_timers t JOIN games g ON g.id = t.game_id
             WHERE t.game_id = ?",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TimerRow::decode).transpose()
    }

    /// Load a game's timer, creating an idle one over `default` on first access
    pub async fn load_or_init_timer(
        &self,
        game_id: &str,
        default: &Schedule,
    ) -> Result<StoredTimer> {
        if let Some(stored) = self.load_timer(game_id).await? {
            return Ok(stored);
        }

        if self.game_status(game_id).await?.is_none() {
            return Err(TimerError::not_found(game_id));
        }

        let fresh = TimerState::new(default.clone());
        sqlx::query(
            "INSERT OR IGNORE INTO game_timers
                (game_id, status, started_at, paused_at, total_paused_seconds, schedule, version)
             VALUES (?, ?, NULL, NULL, 0, ?, 0)",
        )
        .bind(game_id)
        .bind(fresh.status.as_str())
        .bind(encode_schedule(&fresh.schedule)?)
        .execute(&self.pool)
        .await?;

        info!("Created idle timer for game {}", game_id);

        // Another reader may have inserted first; the stored row wins
        self.load_timer(game_id)
            .await?
            .ok_or_else(|| TimerError::not_found(game_id))
    }

    /// Overwrite the timer row only if neither it nor its game's status
    /// changed since `expected` was read
    pub async fn compare_and_swap(
        &self,
        game_id: &str,
        expected: &StoredTimer,
        state: &TimerState,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE game_timers
             SET status = ?, started_at = ?, paused_at = ?, total_paused_seconds = ?,
                 schedule = ?, version = version + 1
             WHERE game_id = ? AND version = ?
               AND EXISTS (SELECT 1 FROM games WHERE id = game_timers.game_id AND status = ?)",
        )
        .bind(state.status.as_str())
        .bind(format_timestamp(state.started_at))
        .bind(format_timestamp(state.paused_at))
        .bind(state.total_paused_seconds)
        .bind(encode_schedule(&state.schedule)?)
        .bind(game_id)
        .bind(expected.version)
        .bind(expected.game_status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Atomically replace a game's timer with `change(current, game_status)`.
    ///
    /// `change` is re-run against the fresh record whenever another writer
    /// got in first, so its precondition checks always see the latest state
    /// of both the timer and its game.
    pub async fn update_timer<F>(
        &self,
        game_id: &str,
        default: &Schedule,
        mut change: F,
    ) -> Result<TimerState>
    where
        F: FnMut(&TimerState, GameStatus) -> Result<TimerState>,
    {
        for attempt in 1..=MAX_SWAP_ATTEMPTS {
            let stored = self.load_or_init_timer(game_id, default).await?;
            let next = change(&stored.state, stored.game_status)?;

            if self.compare_and_swap(game_id, &stored, &next).await? {
                return Ok(next);
            }

            debug!("Timer for game {} changed concurrently (attempt {})", game_id, attempt);
        }

        warn!(
            "Giving up on timer update for game {} after {} attempts",
            game_id, MAX_SWAP_ATTEMPTS
        );
        Err(TimerError::Conflict {
            game_id: game_id.to_string(),
        })
    }

    /// All presets in their stored order
    pub async fn list_presets(&self) -> Result<PresetBook> {
        let rows: Vec<PresetRow> =
            sqlx::query_as("SELECT name, levels FROM timer_presets ORDER BY position")
                .fetch_all(&self.pool)
                .await?;

        let presets = rows
            .into_iter()
            .map(PresetRow::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(PresetBook::new(presets))
    }

    /// Replace the whole preset collection, keeping the given order
    pub async fn save_presets(&self, book: &PresetBook) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM timer_presets").execute(&mut *tx).await?;
        for (position, preset) in book.presets.iter().enumerate() {
            sqlx::query("INSERT INTO timer_presets (position, name, levels) VALUES (?, ?, ?)")
                .bind(position as i64)
                .bind(&preset.name)
                .bind(encode_schedule(&preset.levels)?)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!("Saved {} timer presets", book.len());
        Ok(())
    }
}
