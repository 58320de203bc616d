//! Integration tests for the registration backend.
//!
//! Each test spawns the real router over a temp SQLite database and drives
//! the workflow end to end over HTTP.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::init_database;
use crate::notify::Notifier;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let (notifier, rx) = Notifier::channel();
        tokio::spawn(crate::notify::log_notifications(rx));

        let state = AppState::new(pool, config, notifier);
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .put(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    // ---- workflow helpers ----

    async fn create_university(&self, name: &str) -> String {
        let (status, body) = self.post("/api/universities", json!({ "name": name })).await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_user(&self, name: &str, role: &str, university_id: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users",
                json!({ "displayName": name, "role": role, "universityId": university_id }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_competition(&self, name: &str, team_size: i64) -> String {
        let (status, body) = self
            .post(
                "/api/competitions",
                json!({ "name": name, "teamSize": team_size }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_site(&self, competition_id: &str, name: &str, capacity: i64) -> String {
        let (status, body) = self
            .post(
                &format!("/api/competitions/{}/sites", competition_id),
                json!({ "name": name, "capacity": capacity }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn join_individual(&self, competition_id: &str, user_id: &str, site_id: &str) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/competitions/{}/teams/join", competition_id),
                json!({ "userId": user_id, "siteId": site_id }),
            )
            .await;
        assert_eq!(status, 200, "join failed: {}", body);
        body["data"].clone()
    }

    async fn approve_teams(&self, competition_id: &str, team_ids: Vec<&str>) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/competitions/{}/approvals/teams", competition_id),
                json!({ "teamIds": team_ids }),
            )
            .await;
        assert_eq!(status, 200);
        body["data"].clone()
    }
}

/// One competition with a university, one site and N registered solo teams.
///
/// Uses team size 1 so a single join produces an approvable team.
struct SoloCompetition {
    competition_id: String,
    university_id: String,
    site_id: String,
    team_ids: Vec<String>,
}

async fn solo_competition(fixture: &TestFixture, site_capacity: i64, students: usize) -> SoloCompetition {
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Regional Finals", 1).await;
    let site_id = fixture
        .create_site(&competition_id, "Main Lab", site_capacity)
        .await;

    let mut team_ids = Vec::new();
    for i in 0..students {
        let user_id = fixture
            .create_user(&format!("Student {}", i), "student", &university_id)
            .await;
        let team = fixture
            .join_individual(&competition_id, &user_id, &site_id)
            .await;
        team_ids.push(team["id"].as_str().unwrap().to_string());
    }

    SoloCompetition {
        competition_id,
        university_id,
        site_id,
        team_ids,
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::with_psk(Some("secret-key".to_string())).await;

    // Request without API key
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/universities"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::with_psk(Some("correct-key".to_string())).await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/universities"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_duplicate_site_name_rejected() {
    let fixture = TestFixture::new().await;
    let competition_id = fixture.create_competition("Finals", 3).await;

    fixture.create_site(&competition_id, "Lab1", 5).await;
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/sites", competition_id),
            json!({ "name": "Lab1", "capacity": 10 }),
        )
        .await;

    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "DUPLICATE_SITE_NAME");

    // Different case is a different name (exact match).
    let (status, _) = fixture
        .post(
            &format!("/api/competitions/{}/sites", competition_id),
            json!({ "name": "lab1", "capacity": 10 }),
        )
        .await;
    assert_eq!(status, 200);

    // Renaming onto an existing name is rejected the same way.
    let other = fixture.create_site(&competition_id, "Lab2", 5).await;
    let (status, body) = fixture
        .put(&format!("/api/sites/{}/name", other), json!({ "name": "Lab1" }))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "DUPLICATE_SITE_NAME");
}

#[tokio::test]
async fn test_capacity_exceeded_on_approval() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 2, 3).await;

    let outcomes = fixture
        .approve_teams(
            &setup.competition_id,
            setup.team_ids.iter().map(|s| s.as_str()).collect(),
        )
        .await;

    let outcomes = outcomes.as_array().unwrap();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0]["applied"], true);
    assert_eq!(outcomes[1]["applied"], true);
    assert_eq!(outcomes[2]["applied"], false);
    assert_eq!(outcomes[2]["error"]["code"], "CAPACITY_EXCEEDED");

    // The failed team stays PENDING; occupancy stops at capacity.
    let (_, team) = fixture.get(&format!("/api/teams/{}", setup.team_ids[2])).await;
    assert_eq!(team["data"]["status"], "pending");

    let (_, cap) = fixture
        .get(&format!("/api/sites/{}/capacity", setup.site_id))
        .await;
    assert_eq!(cap["data"]["occupied"], 2);
    assert_eq!(cap["data"]["capacity"], 2);
}

#[tokio::test]
async fn test_team_approval_is_idempotent() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 5, 1).await;
    let team_id = setup.team_ids[0].as_str();

    // Approving the same team twice in one batch reserves one seat.
    let outcomes = fixture
        .approve_teams(&setup.competition_id, vec![team_id, team_id])
        .await;
    assert_eq!(outcomes[0]["applied"], true);
    assert_eq!(outcomes[1]["applied"], true);

    // And a retried batch still does not double-reserve.
    fixture
        .approve_teams(&setup.competition_id, vec![team_id])
        .await;

    let (_, cap) = fixture
        .get(&format!("/api/sites/{}/capacity", setup.site_id))
        .await;
    assert_eq!(cap["data"]["occupied"], 1);
}

#[tokio::test]
async fn test_set_capacity_below_occupied_rejected() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 2, 2).await;
    fixture
        .approve_teams(
            &setup.competition_id,
            setup.team_ids.iter().map(|s| s.as_str()).collect(),
        )
        .await;

    let (status, body) = fixture
        .put(
            &format!("/api/sites/{}/capacity", setup.site_id),
            json!({ "capacity": 1 }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CAPACITY_BELOW_OCCUPIED");

    // Capacity unchanged; growing is always fine.
    let (_, cap) = fixture
        .get(&format!("/api/sites/{}/capacity", setup.site_id))
        .await;
    assert_eq!(cap["data"]["capacity"], 2);

    let (status, _) = fixture
        .put(
            &format!("/api/sites/{}/capacity", setup.site_id),
            json!({ "capacity": 4 }),
        )
        .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_join_with_code_fills_team() {
    let fixture = TestFixture::new().await;
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Finals", 2).await;
    let site_id = fixture.create_site(&competition_id, "Lab1", 5).await;

    let alice = fixture.create_user("Alice", "student", &university_id).await;
    let bob = fixture.create_user("Bob", "student", &university_id).await;
    let carol = fixture.create_user("Carol", "student", &university_id).await;

    let team = fixture.join_individual(&competition_id, &alice, &site_id).await;
    let team_code = team["teamCode"].as_str().unwrap();
    let team_id = team["id"].as_str().unwrap();

    // Bob completes the roster.
    let (status, body) = fixture
        .post(
            "/api/teams/join",
            json!({ "userId": bob, "teamCode": team_code }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["participants"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["status"], "pending");

    // Carol bounces off the full roster.
    let (status, body) = fixture
        .post(
            "/api/teams/join",
            json!({ "userId": carol, "teamCode": team_code }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "TEAM_FULL");

    // Unknown codes are rejected.
    let (status, body) = fixture
        .post(
            "/api/teams/join",
            json!({ "userId": carol, "teamCode": "NOPE1234" }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "INVALID_CODE");

    // Alice cannot register twice.
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/teams/join", competition_id),
            json!({ "userId": alice, "siteId": site_id }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "ALREADY_REGISTERED");

    // The full team shows up in the staff pending overview.
    let (_, pending) = fixture
        .get(&format!("/api/competitions/{}/pending", competition_id))
        .await;
    let awaiting = pending["data"]["teamsAwaitingApproval"].as_array().unwrap();
    assert_eq!(awaiting.len(), 1);
    assert_eq!(awaiting[0]["id"], team_id);
}

#[tokio::test]
async fn test_default_site_assignment() {
    let fixture = TestFixture::new().await;
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Finals", 1).await;
    let site_id = fixture.create_site(&competition_id, "Lab1", 5).await;
    let student = fixture.create_user("Dana", "student", &university_id).await;

    // No default configured yet.
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/teams/join", competition_id),
            json!({ "userId": student }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NO_DEFAULT_SITE");

    let (status, _) = fixture
        .put(
            &format!("/api/competitions/{}/default-sites", competition_id),
            json!({ "universityId": university_id, "siteId": site_id }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/teams/join", competition_id),
            json!({ "userId": student }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["siteId"], site_id.as_str());
}

#[tokio::test]
async fn test_name_change_approval_flow() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 5, 1).await;
    let team_id = setup.team_ids[0].as_str();

    let (status, body) = fixture
        .post(
            &format!("/api/teams/{}/name-change", team_id),
            json!({ "newName": "ByteBusters" }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["pendingName"], "ByteBusters");

    // Only one outstanding name request at a time.
    let (status, body) = fixture
        .post(
            &format!("/api/teams/{}/name-change", team_id),
            json!({ "newName": "SecondThoughts" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "REQUEST_ALREADY_PENDING");

    // Approval applies the pending name.
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/names", setup.competition_id),
            json!({ "approveIds": [team_id] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["applied"], true);

    let (_, team) = fixture.get(&format!("/api/teams/{}", team_id)).await;
    assert_eq!(team["data"]["name"], "ByteBusters");
    assert_eq!(team["data"]["nameApproved"], true);
    assert!(team["data"]["pendingName"].is_null());

    // Rejection discards the pending name.
    fixture
        .post(
            &format!("/api/teams/{}/name-change", team_id),
            json!({ "newName": "Regrettable" }),
        )
        .await;
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/names", setup.competition_id),
            json!({ "rejectIds": [team_id] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["action"], "reject");
    assert_eq!(body["data"][0]["applied"], true);

    let (_, team) = fixture.get(&format!("/api/teams/{}", team_id)).await;
    assert_eq!(team["data"]["name"], "ByteBusters");
    assert!(team["data"]["pendingName"].is_null());
}

#[tokio::test]
async fn test_site_change_moves_capacity() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 1, 1).await;
    let team_id = setup.team_ids[0].as_str();
    let other_site = fixture
        .create_site(&setup.competition_id, "Second Lab", 1)
        .await;

    fixture
        .approve_teams(&setup.competition_id, vec![team_id])
        .await;

    let (status, _) = fixture
        .post(
            &format!("/api/teams/{}/site-change", team_id),
            json!({ "newSiteId": other_site }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/sites", setup.competition_id),
            json!({ "approveIds": [team_id] }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"][0]["applied"], true);

    let (_, team) = fixture.get(&format!("/api/teams/{}", team_id)).await;
    assert_eq!(team["data"]["siteId"], other_site.as_str());
    assert!(team["data"]["pendingSiteId"].is_null());

    let (_, old_cap) = fixture
        .get(&format!("/api/sites/{}/capacity", setup.site_id))
        .await;
    assert_eq!(old_cap["data"]["occupied"], 0);
    let (_, new_cap) = fixture
        .get(&format!("/api/sites/{}/capacity", other_site))
        .await;
    assert_eq!(new_cap["data"]["occupied"], 1);
}

#[tokio::test]
async fn test_site_change_partial_batch() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 3, 3).await;
    fixture
        .approve_teams(
            &setup.competition_id,
            setup.team_ids.iter().map(|s| s.as_str()).collect(),
        )
        .await;

    let roomy = fixture.create_site(&setup.competition_id, "Roomy", 1).await;
    let cramped = fixture
        .create_site(&setup.competition_id, "Cramped", 1)
        .await;

    // Teams 0 and 1 request moves while both targets still have room.
    let (status, _) = fixture
        .post(
            &format!("/api/teams/{}/site-change", setup.team_ids[0]),
            json!({ "newSiteId": roomy }),
        )
        .await;
    assert_eq!(status, 200);
    let (status, _) = fixture
        .post(
            &format!("/api/teams/{}/site-change", setup.team_ids[1]),
            json!({ "newSiteId": cramped }),
        )
        .await;
    assert_eq!(status, 200);

    // Team 2 fills Cramped before the batch is decided.
    let (status, _) = fixture
        .post(
            &format!("/api/teams/{}/site-change", setup.team_ids[2]),
            json!({ "newSiteId": cramped }),
        )
        .await;
    assert_eq!(status, 200);
    let (_, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/sites", setup.competition_id),
            json!({ "approveIds": [setup.team_ids[2]] }),
        )
        .await;
    assert_eq!(body["data"][0]["applied"], true);

    // One batch: team 0 succeeds, team 1 fails on the now-full site.
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/sites", setup.competition_id),
            json!({ "approveIds": [setup.team_ids[0], setup.team_ids[1]] }),
        )
        .await;
    assert_eq!(status, 200);
    let outcomes = body["data"].as_array().unwrap();
    assert_eq!(outcomes[0]["applied"], true);
    assert_eq!(outcomes[1]["applied"], false);
    assert_eq!(outcomes[1]["error"]["code"], "CAPACITY_EXCEEDED");

    // The failed request stays pending for a retry; the team keeps its seat.
    let (_, team) = fixture
        .get(&format!("/api/teams/{}", setup.team_ids[1]))
        .await;
    assert_eq!(team["data"]["siteId"], setup.site_id.as_str());
    assert_eq!(team["data"]["pendingSiteId"], cramped.as_str());
}

#[tokio::test]
async fn test_site_change_request_requires_headroom() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 2, 2).await;
    fixture
        .approve_teams(
            &setup.competition_id,
            setup.team_ids.iter().map(|s| s.as_str()).collect(),
        )
        .await;

    let full = fixture.create_site(&setup.competition_id, "Tiny", 1).await;
    let (status, _) = fixture
        .post(
            &format!("/api/teams/{}/site-change", setup.team_ids[0]),
            json!({ "newSiteId": full }),
        )
        .await;
    assert_eq!(status, 200);
    let (_, body) = fixture
        .post(
            &format!("/api/competitions/{}/approvals/sites", setup.competition_id),
            json!({ "approveIds": [setup.team_ids[0]] }),
        )
        .await;
    assert_eq!(body["data"][0]["applied"], true);

    // Tiny is now full, so a new request fails the pre-check.
    let (status, body) = fixture
        .post(
            &format!("/api/teams/{}/site-change", setup.team_ids[1]),
            json!({ "newSiteId": full }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn test_withdraw_releases_capacity() {
    let fixture = TestFixture::new().await;
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Finals", 2).await;
    let site_id = fixture.create_site(&competition_id, "Lab1", 5).await;

    let alice = fixture.create_user("Alice", "student", &university_id).await;
    let bob = fixture.create_user("Bob", "student", &university_id).await;

    let team = fixture.join_individual(&competition_id, &alice, &site_id).await;
    let team_id = team["id"].as_str().unwrap();
    fixture
        .post(
            "/api/teams/join",
            json!({ "userId": bob, "teamCode": team["teamCode"] }),
        )
        .await;
    fixture.approve_teams(&competition_id, vec![team_id]).await;

    let (_, cap) = fixture.get(&format!("/api/sites/{}/capacity", site_id)).await;
    assert_eq!(cap["data"]["occupied"], 1);

    // Bob leaves: the team falls back to PENDING and the seat frees up.
    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/withdraw", competition_id),
            json!({ "userId": bob }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["participants"].as_array().unwrap().len(), 1);

    let (_, cap) = fixture.get(&format!("/api/sites/{}/capacity", site_id)).await;
    assert_eq!(cap["data"]["occupied"], 0);
}

#[tokio::test]
async fn test_close_registration_unregisters_incomplete_teams() {
    let fixture = TestFixture::new().await;
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Finals", 3).await;
    let site_id = fixture.create_site(&competition_id, "Lab1", 5).await;

    let alice = fixture.create_user("Alice", "student", &university_id).await;
    let team = fixture.join_individual(&competition_id, &alice, &site_id).await;
    let team_id = team["id"].as_str().unwrap();

    let (status, body) = fixture
        .post(&format!("/api/competitions/{}/close", competition_id), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["unregisteredTeams"], 1);

    let (_, team) = fixture.get(&format!("/api/teams/{}", team_id)).await;
    assert_eq!(team["data"]["status"], "unregistered");

    // Registration is closed for new joins.
    let carol = fixture.create_user("Carol", "student", &university_id).await;
    let (status, _) = fixture
        .post(
            &format!("/api/competitions/{}/teams/join", competition_id),
            json!({ "userId": carol, "siteId": site_id }),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_seating_run_and_commit() {
    let fixture = TestFixture::new().await;
    let setup = solo_competition(&fixture, 10, 3).await;
    fixture
        .approve_teams(
            &setup.competition_id,
            setup.team_ids.iter().map(|s| s.as_str()).collect(),
        )
        .await;

    let (status, _) = fixture
        .post(
            &format!("/api/sites/{}/labs", setup.site_id),
            json!({
                "building": "K17",
                "buildingCode": "Bongo",
                "seatCount": 5,
                "seatStart": 0,
                "seatSkip": 1,
                "walkOrder": 0
            }),
        )
        .await;
    assert_eq!(status, 200);

    let (status, body) = fixture
        .post(&format!("/api/sites/{}/seating", setup.site_id), json!({}))
        .await;
    assert_eq!(status, 200);
    let seats = body["data"].as_array().unwrap();
    assert_eq!(seats.len(), 3);
    let codes: Vec<&str> = seats.iter().map(|s| s["teamSeat"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["Bongo00", "Bongo02", "Bongo04"]);
    assert_eq!(seats[0]["teamSite"], "K17 Bongo");

    // The committed map is retrievable.
    let (_, body) = fixture
        .get(&format!("/api/sites/{}/seating", setup.site_id))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // A 4th registered team exhausts the skip-one pattern in a 5-seat lab.
    let dana = fixture
        .create_user("Dana", "student", &setup.university_id)
        .await;
    let team = fixture
        .join_individual(&setup.competition_id, &dana, &setup.site_id)
        .await;
    fixture
        .approve_teams(&setup.competition_id, vec![team["id"].as_str().unwrap()])
        .await;

    let (status, body) = fixture
        .post(&format!("/api/sites/{}/seating", setup.site_id), json!({}))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_SEATS");

    // The failed run committed nothing; the previous map survives.
    let (_, body) = fixture
        .get(&format!("/api/sites/{}/seating", setup.site_id))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_only_students_can_join() {
    let fixture = TestFixture::new().await;
    let university_id = fixture.create_university("UNSW").await;
    let competition_id = fixture.create_competition("Finals", 3).await;
    let site_id = fixture.create_site(&competition_id, "Lab1", 5).await;
    let coach = fixture.create_user("Coach", "coach", &university_id).await;

    let (status, body) = fixture
        .post(
            &format!("/api/competitions/{}/teams/join", competition_id),
            json!({ "userId": coach, "siteId": site_id }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_validation_and_not_found_errors() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post("/api/users", json!({ "displayName": "", "role": "student" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = fixture.get("/api/teams/non-existent-id").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = fixture.get("/api/sites/non-existent-id/capacity").await;
    assert_eq!(status, 404);
}
