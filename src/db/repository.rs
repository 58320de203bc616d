//! Database repository for registration data.
//!
//! Uses prepared statements and transactions for data integrity. Multi-step
//! mutations (staging/applying change requests, registering a team,
//! committing a seat map) each run as one transaction so a half-applied
//! change is never observable.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Competition, CreateCompetitionRequest, CreateLabRequest, CreateUniversityRequest,
    CreateUserRequest, Lab, PendingRequest, RequestKind, Role, SeatAssignment, Site, Team,
    TeamStatus, University, User,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== USER OPERATIONS ====================

    /// Create a new user.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, display_name, email, role, university_id, created_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(&request.display_name)
        .bind(&request.email)
        .bind(request.role.as_str())
        .bind(&request.university_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            display_name: request.display_name.clone(),
            email: request.email.clone(),
            role: request.role,
            university_id: request.university_id.clone(),
            created_at: now,
        })
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT id, display_name, email, role, university_id, created_at FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// IDs of the coaches affiliated with a university.
    pub async fn list_coach_ids(&self, university_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query("SELECT id FROM users WHERE role = 'coach' AND university_id = ?")
            .bind(university_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    // ==================== UNIVERSITY OPERATIONS ====================

    /// Create a new university.
    pub async fn create_university(
        &self,
        request: &CreateUniversityRequest,
    ) -> Result<University, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO universities (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&request.name)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(University {
            id,
            name: request.name.clone(),
            created_at: now,
        })
    }

    /// List all universities.
    pub async fn list_universities(&self) -> Result<Vec<University>, AppError> {
        let rows = sqlx::query("SELECT id, name, created_at FROM universities ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| University {
                id: row.get("id"),
                name: row.get("name"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    // ==================== COMPETITION OPERATIONS ====================

    /// Create a new competition.
    pub async fn create_competition(
        &self,
        request: &CreateCompetitionRequest,
    ) -> Result<Competition, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let team_size = request.team_size.unwrap_or(3);

        sqlx::query(
            "INSERT INTO competitions (id, name, team_size, registration_open, created_at) VALUES (?, ?, ?, 1, ?)"
        )
        .bind(&id)
        .bind(&request.name)
        .bind(team_size)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Competition {
            id,
            name: request.name.clone(),
            team_size,
            registration_open: true,
            created_at: now,
        })
    }

    /// Get a competition by ID.
    pub async fn get_competition(&self, id: &str) -> Result<Option<Competition>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, team_size, registration_open, created_at FROM competitions WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let open: i64 = row.get("registration_open");
            Competition {
                id: row.get("id"),
                name: row.get("name"),
                team_size: row.get("team_size"),
                registration_open: open != 0,
                created_at: row.get("created_at"),
            }
        }))
    }

    /// Configure the default site for a university in a competition.
    pub async fn set_default_site(
        &self,
        competition_id: &str,
        university_id: &str,
        site_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO default_sites (competition_id, university_id, site_id) VALUES (?, ?, ?)
             ON CONFLICT (competition_id, university_id) DO UPDATE SET site_id = excluded.site_id",
        )
        .bind(competition_id)
        .bind(university_id)
        .bind(site_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Look up a university's default site for a competition.
    pub async fn get_default_site(
        &self,
        competition_id: &str,
        university_id: &str,
    ) -> Result<Option<String>, AppError> {
        let row = sqlx::query(
            "SELECT site_id FROM default_sites WHERE competition_id = ? AND university_id = ?",
        )
        .bind(competition_id)
        .bind(university_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("site_id")))
    }

    // ==================== SITE OPERATIONS ====================

    /// Create a new site. Name uniqueness is checked by the site engine.
    pub async fn create_site(
        &self,
        competition_id: &str,
        name: &str,
        capacity: i64,
    ) -> Result<Site, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO sites (id, competition_id, name, capacity, occupied, created_at) VALUES (?, ?, ?, ?, 0, ?)"
        )
        .bind(&id)
        .bind(competition_id)
        .bind(name)
        .bind(capacity)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Site {
            id,
            competition_id: competition_id.to_string(),
            name: name.to_string(),
            capacity,
            occupied: 0,
            created_at: now,
        })
    }

    /// Get a site by ID.
    pub async fn get_site(&self, id: &str) -> Result<Option<Site>, AppError> {
        let row = sqlx::query(
            "SELECT id, competition_id, name, capacity, occupied, created_at FROM sites WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(site_from_row))
    }

    /// List all sites of a competition.
    pub async fn list_sites(&self, competition_id: &str) -> Result<Vec<Site>, AppError> {
        let rows = sqlx::query(
            "SELECT id, competition_id, name, capacity, occupied, created_at FROM sites WHERE competition_id = ? ORDER BY name"
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(site_from_row).collect())
    }

    /// Check whether a site name is already taken within a competition.
    ///
    /// Case-sensitive exact match; `exclude_id` lets a rename skip the site
    /// being renamed.
    pub async fn site_name_exists(
        &self,
        competition_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM sites WHERE competition_id = ? AND name = ? AND id != ?",
        )
        .bind(competition_id)
        .bind(name)
        .bind(exclude_id.unwrap_or(""))
        .fetch_one(&self.pool)
        .await?;

        let n: i64 = row.get("n");
        Ok(n > 0)
    }

    /// Rename a site. Name uniqueness is checked by the site engine.
    pub async fn rename_site(&self, id: &str, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sites SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Site {} not found", id)));
        }
        Ok(())
    }

    // ==================== LAB / SEAT MAP OPERATIONS ====================

    /// Add a lab to a site's seat map.
    pub async fn create_lab(
        &self,
        site_id: &str,
        request: &CreateLabRequest,
    ) -> Result<Lab, AppError> {
        let id = Uuid::new_v4().to_string();
        let seat_skip = request.seat_skip.unwrap_or(1);

        sqlx::query(
            "INSERT INTO labs (id, site_id, building, building_code, seat_count, seat_start, seat_skip, walk_order) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(site_id)
        .bind(&request.building)
        .bind(&request.building_code)
        .bind(request.seat_count)
        .bind(request.seat_start)
        .bind(seat_skip)
        .bind(request.walk_order)
        .execute(&self.pool)
        .await?;

        Ok(Lab {
            id,
            site_id: site_id.to_string(),
            building: request.building.clone(),
            building_code: request.building_code.clone(),
            seat_count: request.seat_count,
            seat_start: request.seat_start,
            seat_skip,
            walk_order: request.walk_order,
        })
    }

    /// List a site's labs in walk order.
    pub async fn list_labs(&self, site_id: &str) -> Result<Vec<Lab>, AppError> {
        let rows = sqlx::query(
            "SELECT id, site_id, building, building_code, seat_count, seat_start, seat_skip, walk_order FROM labs WHERE site_id = ? ORDER BY walk_order"
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(lab_from_row).collect())
    }

    // ==================== TEAM OPERATIONS ====================

    /// Insert a new team with its first member.
    pub async fn create_team(&self, team: &Team) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO teams (
                id, competition_id, university_id, name, pending_name, name_approved,
                status, level, site_id, pending_site_id, team_code, created_at
            ) VALUES (?, ?, ?, ?, NULL, ?, ?, ?, ?, NULL, ?, ?)"#,
        )
        .bind(&team.id)
        .bind(&team.competition_id)
        .bind(&team.university_id)
        .bind(&team.name)
        .bind(team.name_approved as i32)
        .bind(team.status.as_str())
        .bind(&team.level)
        .bind(&team.site_id)
        .bind(&team.team_code)
        .bind(&team.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, user_id) in team.participants.iter().enumerate() {
            sqlx::query("INSERT INTO team_members (team_id, user_id, position) VALUES (?, ?, ?)")
                .bind(&team.id)
                .bind(user_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Get a team by ID, with its roster.
    pub async fn get_team(&self, id: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(&format!("{} WHERE t.id = ?", TEAM_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_team(team_from_row(&row)).await?)),
            None => Ok(None),
        }
    }

    /// Resolve a team by its join code.
    pub async fn get_team_by_code(&self, code: &str) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(&format!("{} WHERE t.team_code = ?", TEAM_SELECT))
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_team(team_from_row(&row)).await?)),
            None => Ok(None),
        }
    }

    /// List a competition's teams, optionally filtered by status.
    pub async fn list_teams(
        &self,
        competition_id: &str,
        status: Option<TeamStatus>,
    ) -> Result<Vec<Team>, AppError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE t.competition_id = ? AND t.status = ? ORDER BY t.created_at",
                    TEAM_SELECT
                ))
                .bind(competition_id)
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "{} WHERE t.competition_id = ? ORDER BY t.created_at",
                    TEAM_SELECT
                ))
                .bind(competition_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut teams = Vec::with_capacity(rows.len());
        for row in &rows {
            teams.push(self.hydrate_team(team_from_row(row)).await?);
        }
        Ok(teams)
    }

    /// Find the team a user currently belongs to in a competition, if any.
    ///
    /// UNREGISTERED teams do not count; their members may register afresh.
    pub async fn find_team_of_user(
        &self,
        competition_id: &str,
        user_id: &str,
    ) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(&format!(
            r#"{} JOIN team_members tm ON tm.team_id = t.id
               WHERE t.competition_id = ? AND tm.user_id = ? AND t.status != 'unregistered'"#,
            TEAM_SELECT
        ))
        .bind(competition_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_team(team_from_row(&row)).await?)),
            None => Ok(None),
        }
    }

    /// Find the oldest PENDING team of a university with roster space.
    pub async fn find_open_team(
        &self,
        competition_id: &str,
        university_id: &str,
    ) -> Result<Option<Team>, AppError> {
        let row = sqlx::query(&format!(
            r#"{} WHERE t.competition_id = ? AND t.university_id = ? AND t.status = 'pending'
               AND (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) < c.team_size
               ORDER BY t.created_at LIMIT 1"#,
            TEAM_SELECT
        ))
        .bind(competition_id)
        .bind(university_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_team(team_from_row(&row)).await?)),
            None => Ok(None),
        }
    }

    /// List full PENDING teams awaiting assignment approval.
    pub async fn list_full_pending_teams(
        &self,
        competition_id: &str,
    ) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(&format!(
            r#"{} WHERE t.competition_id = ? AND t.status = 'pending'
               AND (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) = c.team_size
               ORDER BY t.created_at"#,
            TEAM_SELECT
        ))
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await?;

        let mut teams = Vec::with_capacity(rows.len());
        for row in &rows {
            teams.push(self.hydrate_team(team_from_row(row)).await?);
        }
        Ok(teams)
    }

    /// List REGISTERED teams assigned to a site, ordered by team id.
    pub async fn list_registered_teams_at_site(
        &self,
        site_id: &str,
    ) -> Result<Vec<Team>, AppError> {
        let rows = sqlx::query(&format!(
            "{} WHERE t.site_id = ? AND t.status = 'registered' ORDER BY t.id",
            TEAM_SELECT
        ))
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        let mut teams = Vec::with_capacity(rows.len());
        for row in &rows {
            teams.push(self.hydrate_team(team_from_row(row)).await?);
        }
        Ok(teams)
    }

    /// Append a user to a team's roster.
    pub async fn add_team_member(&self, team_id: &str, user_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO team_members (team_id, user_id, position)
               VALUES (?, ?, (SELECT COUNT(*) FROM team_members WHERE team_id = ?))"#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(team_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a user from a team's roster. Returns the remaining roster size.
    pub async fn remove_team_member(&self, team_id: &str, user_id: &str) -> Result<i64, AppError> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member of team {}",
                user_id, team_id
            )));
        }

        let row = sqlx::query("SELECT COUNT(*) AS n FROM team_members WHERE team_id = ?")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    /// Set a team's status.
    pub async fn set_team_status(&self, team_id: &str, status: TeamStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE teams SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(team_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark a team REGISTERED at a site, clearing any outstanding site request.
    pub async fn register_team(&self, team_id: &str, site_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE teams SET status = 'registered', site_id = ?, pending_site_id = NULL WHERE id = ?"
        )
        .bind(site_id)
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pending_requests WHERE team_id = ? AND kind = 'site'")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Close registration: incomplete PENDING teams become UNREGISTERED.
    ///
    /// Returns the teams that were shut out so the caller can notify them.
    pub async fn close_registration(&self, competition_id: &str) -> Result<Vec<Team>, AppError> {
        let incomplete = {
            let rows = sqlx::query(&format!(
                r#"{} WHERE t.competition_id = ? AND t.status = 'pending'
                   AND (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) < c.team_size"#,
                TEAM_SELECT
            ))
            .bind(competition_id)
            .fetch_all(&self.pool)
            .await?;

            let mut teams = Vec::with_capacity(rows.len());
            for row in &rows {
                teams.push(self.hydrate_team(team_from_row(row)).await?);
            }
            teams
        };

        let mut tx = self.pool.begin().await?;

        for team in &incomplete {
            sqlx::query("UPDATE teams SET status = 'unregistered' WHERE id = ?")
                .bind(&team.id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE competitions SET registration_open = 0 WHERE id = ?")
            .bind(competition_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(incomplete)
    }

    // ==================== PENDING REQUEST OPERATIONS ====================

    /// Get a team's outstanding request of a given kind, if any.
    pub async fn get_pending_request(
        &self,
        team_id: &str,
        kind: RequestKind,
    ) -> Result<Option<PendingRequest>, AppError> {
        let row = sqlx::query(
            "SELECT id, team_id, kind, requested_value, requested_at FROM pending_requests WHERE team_id = ? AND kind = ?"
        )
        .bind(team_id)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(request_from_row))
    }

    /// List a competition's outstanding requests of a given kind.
    pub async fn list_pending_requests(
        &self,
        competition_id: &str,
        kind: RequestKind,
    ) -> Result<Vec<PendingRequest>, AppError> {
        let rows = sqlx::query(
            r#"SELECT pr.id, pr.team_id, pr.kind, pr.requested_value, pr.requested_at
               FROM pending_requests pr
               JOIN teams t ON t.id = pr.team_id
               WHERE t.competition_id = ? AND pr.kind = ?
               ORDER BY pr.requested_at"#,
        )
        .bind(competition_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(request_from_row).collect())
    }

    /// Stage a name change: set `pending_name` and enqueue the request.
    ///
    /// The UNIQUE(team_id, kind) index backs the at-most-one-pending guard
    /// should two requests race past the registry's pre-check.
    pub async fn stage_name_change(&self, team_id: &str, new_name: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE teams SET pending_name = ? WHERE id = ?")
            .bind(new_name)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO pending_requests (id, team_id, kind, requested_value, requested_at) VALUES (?, ?, 'name', ?, ?)"
        )
        .bind(Uuid::new_v4().to_string())
        .bind(team_id)
        .bind(new_name)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Apply a staged name change: `name := pending_name`, mark approved.
    pub async fn apply_name_change(&self, team_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE teams SET name = pending_name, name_approved = 1, pending_name = NULL WHERE id = ? AND pending_name IS NOT NULL"
        )
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No name change pending for team {}",
                team_id
            )));
        }

        sqlx::query("DELETE FROM pending_requests WHERE team_id = ? AND kind = 'name'")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Discard a staged name change without applying it.
    pub async fn discard_name_change(&self, team_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE teams SET pending_name = NULL WHERE id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM pending_requests WHERE team_id = ? AND kind = 'name'")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Stage a site change: set `pending_site_id` and enqueue the request.
    pub async fn stage_site_change(&self, team_id: &str, new_site_id: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE teams SET pending_site_id = ? WHERE id = ?")
            .bind(new_site_id)
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO pending_requests (id, team_id, kind, requested_value, requested_at) VALUES (?, ?, 'site', ?, ?)"
        )
        .bind(Uuid::new_v4().to_string())
        .bind(team_id)
        .bind(new_site_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Apply a staged site change: `site_id := pending_site_id`.
    pub async fn apply_site_change(&self, team_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE teams SET site_id = pending_site_id, pending_site_id = NULL WHERE id = ? AND pending_site_id IS NOT NULL"
        )
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "No site change pending for team {}",
                team_id
            )));
        }

        sqlx::query("DELETE FROM pending_requests WHERE team_id = ? AND kind = 'site'")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Discard a staged site change without applying it.
    pub async fn discard_site_change(&self, team_id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE teams SET pending_site_id = NULL WHERE id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM pending_requests WHERE team_id = ? AND kind = 'site'")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ==================== SEAT ASSIGNMENT OPERATIONS ====================

    /// Commit a seating run for a site, replacing any previous run.
    pub async fn replace_seat_assignments(
        &self,
        site_id: &str,
        assignments: &[SeatAssignment],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM seat_assignments WHERE site_id = ?")
            .bind(site_id)
            .execute(&mut *tx)
            .await?;

        for (position, seat) in assignments.iter().enumerate() {
            sqlx::query(
                "INSERT INTO seat_assignments (site_id, position, team_site, team_seat, team_id, team_name, team_level) VALUES (?, ?, ?, ?, ?, ?, ?)"
            )
            .bind(site_id)
            .bind(position as i64)
            .bind(&seat.team_site)
            .bind(&seat.team_seat)
            .bind(&seat.team_id)
            .bind(&seat.team_name)
            .bind(&seat.team_level)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetch the last committed seating run for a site, in assignment order.
    pub async fn list_seat_assignments(
        &self,
        site_id: &str,
    ) -> Result<Vec<SeatAssignment>, AppError> {
        let rows = sqlx::query(
            "SELECT site_id, team_site, team_seat, team_id, team_name, team_level FROM seat_assignments WHERE site_id = ? ORDER BY position"
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SeatAssignment {
                site_id: row.get("site_id"),
                team_site: row.get("team_site"),
                team_seat: row.get("team_seat"),
                team_id: row.get("team_id"),
                team_name: row.get("team_name"),
                team_level: row.get("team_level"),
            })
            .collect())
    }

    /// Load a team's roster in join order.
    async fn hydrate_team(&self, mut team: Team) -> Result<Team, AppError> {
        let rows = sqlx::query(
            "SELECT user_id FROM team_members WHERE team_id = ? ORDER BY position",
        )
        .bind(&team.id)
        .fetch_all(&self.pool)
        .await?;

        team.participants = rows.iter().map(|r| r.get("user_id")).collect();
        Ok(team)
    }
}

/// Shared SELECT head joining teams with their competition's team size.
const TEAM_SELECT: &str = r#"SELECT t.id, t.competition_id, t.university_id, t.name,
    t.pending_name, t.name_approved, t.status, t.level, t.site_id, t.pending_site_id,
    t.team_code, t.created_at, c.team_size
    FROM teams t JOIN competitions c ON c.id = t.competition_id"#;

// Helper functions for row conversion

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    let role: String = row.get("role");
    User {
        id: row.get("id"),
        display_name: row.get("display_name"),
        email: row.get("email"),
        role: Role::from_str(&role).unwrap_or(Role::Student),
        university_id: row.get("university_id"),
        created_at: row.get("created_at"),
    }
}

fn site_from_row(row: &sqlx::sqlite::SqliteRow) -> Site {
    Site {
        id: row.get("id"),
        competition_id: row.get("competition_id"),
        name: row.get("name"),
        capacity: row.get("capacity"),
        occupied: row.get("occupied"),
        created_at: row.get("created_at"),
    }
}

fn lab_from_row(row: &sqlx::sqlite::SqliteRow) -> Lab {
    Lab {
        id: row.get("id"),
        site_id: row.get("site_id"),
        building: row.get("building"),
        building_code: row.get("building_code"),
        seat_count: row.get("seat_count"),
        seat_start: row.get("seat_start"),
        seat_skip: row.get("seat_skip"),
        walk_order: row.get("walk_order"),
    }
}

fn team_from_row(row: &sqlx::sqlite::SqliteRow) -> Team {
    let name_approved: i64 = row.get("name_approved");
    let status: String = row.get("status");
    Team {
        id: row.get("id"),
        competition_id: row.get("competition_id"),
        university_id: row.get("university_id"),
        name: row.get("name"),
        pending_name: row.get("pending_name"),
        name_approved: name_approved != 0,
        status: TeamStatus::from_str(&status).unwrap_or(TeamStatus::Pending),
        level: row.get("level"),
        site_id: row.get("site_id"),
        pending_site_id: row.get("pending_site_id"),
        team_code: row.get("team_code"),
        participants: Vec::new(),
        team_size: row.get("team_size"),
        created_at: row.get("created_at"),
    }
}

fn request_from_row(row: &sqlx::sqlite::SqliteRow) -> PendingRequest {
    let kind: String = row.get("kind");
    PendingRequest {
        id: row.get("id"),
        team_id: row.get("team_id"),
        kind: RequestKind::from_str(&kind).unwrap_or(RequestKind::Name),
        requested_value: row.get("requested_value"),
        requested_at: row.get("requested_at"),
    }
}
