//! Seat assignment output model.

use serde::{Deserialize, Serialize};

/// One seat allocated to one team, as produced by a seating run.
///
/// `team_site` is the human label "<building> <buildingCode>"; `team_seat` is
/// the lab code plus the numeric seat (e.g. "Bongo04").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatAssignment {
    pub site_id: String,
    pub team_site: String,
    pub team_seat: String,
    pub team_id: String,
    pub team_name: String,
    pub team_level: String,
}
