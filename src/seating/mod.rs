//! Seat assignment algorithm.
//!
//! Pure computation: given the registered teams at a site and the site's
//! seat map, produce one seat per team or fail with `InsufficientSeats`.
//! No partial result is ever returned; committing the output is the
//! caller's job, so a failed or cancelled run leaves no trace.
//!
//! Determinism: teams are grouped by level (levels in ascending order,
//! teams within a level by id ascending) and labs are walked in their
//! configured order, so identical inputs always yield identical seat maps.

use std::collections::BTreeMap;

use crate::errors::AppError;
use crate::models::{Lab, SeatAssignment, Team};

/// The slice of a team the algorithm needs.
#[derive(Debug, Clone)]
pub struct SeatingTeam {
    pub team_id: String,
    pub team_name: String,
    pub level: String,
}

impl From<&Team> for SeatingTeam {
    fn from(team: &Team) -> Self {
        Self {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            level: team.level.clone(),
        }
    }
}

/// Assign every team a seat, spacing teams by each lab's skip count.
///
/// After a team is seated, `seat_skip` seats are left empty before the next
/// team. The seat cursor carries across level groups within a lab and resets
/// only when the walk moves to the next lab.
pub fn assign_seats(
    site_id: &str,
    teams: &[SeatingTeam],
    labs: &[Lab],
) -> Result<Vec<SeatAssignment>, AppError> {
    // Level groups in ascending level order, teams by id within each group.
    let mut groups: BTreeMap<&str, Vec<&SeatingTeam>> = BTreeMap::new();
    for team in teams {
        groups.entry(team.level.as_str()).or_default().push(team);
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| a.team_id.cmp(&b.team_id));
    }

    let mut assignments = Vec::with_capacity(teams.len());
    let mut lab_idx = 0usize;
    let mut seat_idx = 0i64;

    for team in groups.into_values().flatten() {
        // Fall through to the next lab once this one has no seat left.
        while lab_idx < labs.len() && seat_idx >= labs[lab_idx].seat_count {
            lab_idx += 1;
            seat_idx = 0;
        }
        let Some(lab) = labs.get(lab_idx) else {
            return Err(AppError::InsufficientSeats(format!(
                "Site {} has no seat left for team {} ({} teams, {} labs)",
                site_id,
                team.team_id,
                teams.len(),
                labs.len()
            )));
        };

        assignments.push(SeatAssignment {
            site_id: site_id.to_string(),
            team_site: format!("{} {}", lab.building, lab.building_code),
            team_seat: format!("{}{:02}", lab.building_code, lab.seat_start + seat_idx),
            team_id: team.team_id.clone(),
            team_name: team.team_name.clone(),
            team_level: team.level.clone(),
        });
        seat_idx += 1 + lab.seat_skip;
    }

    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab(code: &str, seat_count: i64, seat_skip: i64, walk_order: i64) -> Lab {
        Lab {
            id: format!("lab-{}", code),
            site_id: "site-1".to_string(),
            building: "K17".to_string(),
            building_code: code.to_string(),
            seat_count,
            seat_start: 0,
            seat_skip,
            walk_order,
        }
    }

    fn team(id: &str, level: &str) -> SeatingTeam {
        SeatingTeam {
            team_id: id.to_string(),
            team_name: format!("Team {}", id),
            level: level.to_string(),
        }
    }

    #[test]
    fn skip_one_pattern_spaces_teams() {
        let labs = vec![lab("Bongo", 5, 1, 0)];
        let teams = vec![team("1", "Open"), team("2", "Open"), team("3", "Open")];

        let seats = assign_seats("site-1", &teams, &labs).unwrap();
        let codes: Vec<&str> = seats.iter().map(|s| s.team_seat.as_str()).collect();
        assert_eq!(codes, vec!["Bongo00", "Bongo02", "Bongo04"]);
        assert_eq!(seats[0].team_site, "K17 Bongo");
    }

    #[test]
    fn fourth_team_exhausts_five_seat_lab() {
        let labs = vec![lab("Bongo", 5, 1, 0)];
        let teams = vec![
            team("1", "Open"),
            team("2", "Open"),
            team("3", "Open"),
            team("4", "Open"),
        ];

        let err = assign_seats("site-1", &teams, &labs).unwrap_err();
        assert!(matches!(err, AppError::InsufficientSeats(_)));
    }

    #[test]
    fn no_partial_output_on_failure() {
        let labs = vec![lab("Bongo", 1, 1, 0)];
        let teams = vec![team("1", "Open"), team("2", "Open")];

        assert!(assign_seats("site-1", &teams, &labs).is_err());
    }

    #[test]
    fn repeated_runs_are_identical() {
        let labs = vec![lab("Bongo", 10, 1, 0), lab("Conga", 10, 2, 1)];
        // Deliberately unsorted input.
        let teams = vec![
            team("c", "Open"),
            team("a", "Intermediate"),
            team("b", "Open"),
            team("d", "Intermediate"),
        ];

        let first = assign_seats("site-1", &teams, &labs).unwrap();
        let second = assign_seats("site-1", &teams, &labs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn levels_group_in_ascending_order_by_team_id() {
        let labs = vec![lab("Bongo", 20, 0, 0)];
        let teams = vec![
            team("2", "Open"),
            team("1", "Open"),
            team("9", "Intermediate"),
        ];

        let seats = assign_seats("site-1", &teams, &labs).unwrap();
        let ids: Vec<&str> = seats.iter().map(|s| s.team_id.as_str()).collect();
        // "Intermediate" sorts before "Open"; within a level ids ascend.
        assert_eq!(ids, vec!["9", "1", "2"]);
        let codes: Vec<&str> = seats.iter().map(|s| s.team_seat.as_str()).collect();
        assert_eq!(codes, vec!["Bongo00", "Bongo01", "Bongo02"]);
    }

    #[test]
    fn falls_through_to_next_lab_when_full() {
        let labs = vec![lab("Bongo", 3, 1, 0), lab("Conga", 3, 1, 1)];
        let teams = vec![team("1", "Open"), team("2", "Open"), team("3", "Open")];

        let seats = assign_seats("site-1", &teams, &labs).unwrap();
        let codes: Vec<&str> = seats.iter().map(|s| s.team_seat.as_str()).collect();
        // Two teams fit in Bongo (seats 0 and 2), the third starts Conga.
        assert_eq!(codes, vec!["Bongo00", "Bongo02", "Conga00"]);
    }

    #[test]
    fn seat_numbering_honours_start_offset() {
        let mut offset_lab = lab("Bongo", 4, 0, 0);
        offset_lab.seat_start = 10;
        let teams = vec![team("1", "Open"), team("2", "Open")];

        let seats = assign_seats("site-1", &teams, &[offset_lab]).unwrap();
        let codes: Vec<&str> = seats.iter().map(|s| s.team_seat.as_str()).collect();
        assert_eq!(codes, vec!["Bongo10", "Bongo11"]);
    }

    #[test]
    fn no_teams_yields_empty_map() {
        let labs = vec![lab("Bongo", 5, 1, 0)];
        let seats = assign_seats("site-1", &[], &labs).unwrap();
        assert!(seats.is_empty());
    }
}
