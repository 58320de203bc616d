//! Capacity ledger: per-site seat accounting.
//!
//! This module is the only writer of `sites.occupied`. Every mutation is a
//! single conditional UPDATE checked through `rows_affected`, so concurrent
//! reservations against the same site serialize inside SQLite and can never
//! both slip past the capacity bound. Callers observing a zero-row update get
//! a typed error, never a clamped value.

use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::CapacitySnapshot;

/// Tracks per-site capacity and occupancy.
#[derive(Clone)]
pub struct CapacityLedger {
    pool: SqlitePool,
}

impl CapacityLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Reserve `team_count` units at a site.
    ///
    /// Fails with `CapacityExceeded` when the reservation would push
    /// `occupied` past `capacity`; occupancy is unchanged in that case.
    pub async fn reserve(&self, site_id: &str, team_count: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE sites SET occupied = occupied + ? WHERE id = ? AND occupied + ? <= capacity",
        )
        .bind(team_count)
        .bind(site_id)
        .bind(team_count)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish a missing site from a full one.
            let snapshot = self.capacity_of(site_id).await?;
            return Err(AppError::CapacityExceeded(format!(
                "Site {} is full ({}/{} teams)",
                site_id, snapshot.occupied, snapshot.capacity
            )));
        }
        Ok(())
    }

    /// Release `team_count` units at a site, floored at zero.
    pub async fn release(&self, site_id: &str, team_count: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE sites SET occupied = MAX(occupied - ?, 0) WHERE id = ?")
            .bind(team_count)
            .bind(site_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Read-only snapshot of a site's capacity and occupancy.
    pub async fn capacity_of(&self, site_id: &str) -> Result<CapacitySnapshot, AppError> {
        let row = sqlx::query("SELECT capacity, occupied FROM sites WHERE id = ?")
            .bind(site_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Site {} not found", site_id)))?;

        Ok(CapacitySnapshot {
            capacity: row.get("capacity"),
            occupied: row.get("occupied"),
        })
    }

    /// Change a site's capacity.
    ///
    /// Fails with `CapacityBelowOccupied` when the new capacity would drop
    /// below current commitments; the old capacity is kept.
    pub async fn set_capacity(&self, site_id: &str, new_capacity: i64) -> Result<(), AppError> {
        if new_capacity < 0 {
            return Err(AppError::Validation(
                "Capacity must be non-negative".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE sites SET capacity = ? WHERE id = ? AND occupied <= ?")
            .bind(new_capacity)
            .bind(site_id)
            .bind(new_capacity)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            let snapshot = self.capacity_of(site_id).await?;
            return Err(AppError::CapacityBelowOccupied(format!(
                "Cannot shrink site {} to {} seats: {} teams already assigned",
                site_id, new_capacity, snapshot.occupied
            )));
        }
        Ok(())
    }
}
