//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all registration data. Capacity
//! mutations rely on conditional UPDATEs, so the pool is configured with WAL
//! journaling and a busy timeout to keep concurrent writers serialized
//! rather than failing.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            email TEXT,
            role TEXT NOT NULL,
            university_id TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS universities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS competitions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            team_size INTEGER NOT NULL DEFAULT 3,
            registration_open INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS default_sites (
            competition_id TEXT NOT NULL,
            university_id TEXT NOT NULL,
            site_id TEXT NOT NULL,
            PRIMARY KEY (competition_id, university_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sites (
            id TEXT PRIMARY KEY,
            competition_id TEXT NOT NULL,
            name TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            occupied INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            CHECK (occupied >= 0),
            CHECK (occupied <= capacity)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS labs (
            id TEXT PRIMARY KEY,
            site_id TEXT NOT NULL,
            building TEXT NOT NULL,
            building_code TEXT NOT NULL,
            seat_count INTEGER NOT NULL,
            seat_start INTEGER NOT NULL DEFAULT 0,
            seat_skip INTEGER NOT NULL DEFAULT 1,
            walk_order INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id TEXT PRIMARY KEY,
            competition_id TEXT NOT NULL,
            university_id TEXT NOT NULL,
            name TEXT NOT NULL,
            pending_name TEXT,
            name_approved INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL,
            level TEXT NOT NULL DEFAULT 'Open',
            site_id TEXT,
            pending_site_id TEXT,
            team_code TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_members (
            team_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (team_id, user_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // At most one outstanding request per (team, kind) is enforced here, not
    // just in application code.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pending_requests (
            id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL,
            kind TEXT NOT NULL,
            requested_value TEXT NOT NULL,
            requested_at TEXT NOT NULL,
            UNIQUE (team_id, kind)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS seat_assignments (
            site_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            team_site TEXT NOT NULL,
            team_seat TEXT NOT NULL,
            team_id TEXT NOT NULL,
            team_name TEXT NOT NULL,
            team_level TEXT NOT NULL,
            PRIMARY KEY (site_id, team_seat)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for common queries
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sites_competition ON sites(competition_id);
        CREATE INDEX IF NOT EXISTS idx_labs_site ON labs(site_id);
        CREATE INDEX IF NOT EXISTS idx_teams_competition ON teams(competition_id);
        CREATE INDEX IF NOT EXISTS idx_teams_site ON teams(site_id);
        CREATE INDEX IF NOT EXISTS idx_team_members_user ON team_members(user_id);
        CREATE INDEX IF NOT EXISTS idx_pending_requests_team ON pending_requests(team_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
