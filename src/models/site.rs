//! Site and seat-map models.

use serde::{Deserialize, Serialize};

/// A physical competition venue with bounded seating capacity.
///
/// `occupied` counts REGISTERED teams assigned here, one unit per team. It is
/// mutated only through the capacity ledger so the `occupied <= capacity`
/// invariant holds for every interleaving of reservations and releases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub competition_id: String,
    pub name: String,
    pub capacity: i64,
    pub occupied: i64,
    pub created_at: String,
}

/// Read-only capacity snapshot for a site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySnapshot {
    pub capacity: i64,
    pub occupied: i64,
}

impl CapacitySnapshot {
    pub fn headroom(&self) -> i64 {
        self.capacity - self.occupied
    }
}

/// Request body for creating a site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSiteRequest {
    pub name: String,
    pub capacity: i64,
}

/// Request body for renaming a site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSiteRequest {
    pub name: String,
}

/// Request body for changing a site's capacity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCapacityRequest {
    pub capacity: i64,
}

/// One lab/room of a site's seat map.
///
/// Seats are numbered `seat_start..seat_start+seat_count` and rendered as
/// `<buildingCode><number>` (e.g. "Bongo01"). `seat_skip` is how many seats
/// are left empty after each assigned team; labs are walked in `walk_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    pub id: String,
    pub site_id: String,
    pub building: String,
    pub building_code: String,
    pub seat_count: i64,
    pub seat_start: i64,
    pub seat_skip: i64,
    pub walk_order: i64,
}

/// Request body for adding a lab to a site's seat map.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabRequest {
    pub building: String,
    pub building_code: String,
    pub seat_count: i64,
    #[serde(default)]
    pub seat_start: i64,
    /// Seats to leave empty after each team; defaults to 1.
    #[serde(default)]
    pub seat_skip: Option<i64>,
    pub walk_order: i64,
}
