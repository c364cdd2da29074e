//! Batch-job tests: queue draining, stale refresh, ranking rebuild.

use chrono::{Duration, Utc};
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use octorank::connect_and_migrate;
use octorank::entity::queue_status::QueueStatus;
use octorank::entity::tier::Tier;
use octorank::entity::tracked_user;
use octorank::entity::update_status::UpdateStatus;
use octorank::gate::FixedRateGate;
use octorank::github::GithubClient;
use octorank::notify::NullNotifier;
use octorank::store;
use octorank::sync::batch::{drain_deferred, rebuild_rankings, refresh_stale};
use octorank::sync::UpdateContext;

async fn test_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("test db should migrate")
}

async fn mount_minimal_user(server: &MockServer, username: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{username}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "login": username,
            "type": "User",
            "public_repos": 0,
            "followers": 1,
            "following": 1,
            "repos_url": format!("{}/users/{username}/repos", server.uri()),
            "organizations_url": format!("{}/users/{username}/orgs", server.uri()),
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{username}/repos")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/users/{username}/orgs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}

fn seed_user(username: &str, score: i32, updated_days_ago: i64) -> tracked_user::ActiveModel {
    let now = Utc::now();
    tracked_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        status: Set(UpdateStatus::Completed),
        name: Set(None),
        email: Set(None),
        location: Set(None),
        avatar_url: Set(None),
        company: Set(None),
        bio: Set(None),
        blog: Set(None),
        public_repos: Set(0),
        followers: Set(0),
        following: Set(0),
        total_contribution: Set(0),
        total_stargazers: Set(0),
        continuous_commit_days: Set(0),
        total_score: Set(score),
        current_rank: Set(None),
        previous_rank: Set(None),
        tier: Set(Tier::Iron),
        created_at: Set(now.fixed_offset()),
        updated_at: Set((now - Duration::days(updated_days_ago)).fixed_offset()),
    }
}

#[tokio::test]
async fn drain_marks_success_and_fail() {
    let server = MockServer::start().await;
    let db = test_db().await;
    let client = GithubClient::new("t")
        .expect("client")
        .with_base_url(&server.uri());
    let gate = FixedRateGate::new(1000);
    let ctx = UpdateContext::new(&db, &client, &gate);

    // "good" exists upstream, "ghost" does not.
    mount_minimal_user(&server, "good").await;
    Mock::given(method("GET"))
        .and(path("/users/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    store::queue::enqueue(&db, "good").await.expect("enqueue");
    store::queue::enqueue(&db, "ghost").await.expect("enqueue");

    let outcome = drain_deferred(&ctx).await.expect("drain");
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.updated, 1);
    assert!(!outcome.aborted);

    // Both items were marked; only the failed one is drainable again.
    let pending = store::queue::pending(&db).await.expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].username, "ghost");
    assert_eq!(pending[0].status, QueueStatus::Fail);
}

#[tokio::test]
async fn drain_aborts_batch_on_rate_exhaustion() {
    let server = MockServer::start().await;
    let db = test_db().await;
    let client = GithubClient::new("t")
        .expect("client")
        .with_base_url(&server.uri());
    // Budget covers the batch pre-check and the first user's cycle; the
    // second user's gate probe reads exhausted.
    let gate = FixedRateGate::new(2);
    let ctx = UpdateContext::new(&db, &client, &gate);

    mount_minimal_user(&server, "first").await;
    mount_minimal_user(&server, "second").await;

    store::queue::enqueue(&db, "first").await.expect("enqueue");
    store::queue::enqueue(&db, "second").await.expect("enqueue");

    let outcome = drain_deferred(&ctx).await.expect("drain");
    assert!(outcome.aborted);
    assert_eq!(outcome.updated, 1);

    // The aborted item stays pending for the next drain; draining never
    // re-enqueues, so there is still exactly one item.
    let pending = store::queue::pending(&db).await.expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].username, "second");
}

#[tokio::test]
async fn refresh_skips_recently_updated_users() {
    let server = MockServer::start().await;
    let db = test_db().await;
    let client = GithubClient::new("t")
        .expect("client")
        .with_base_url(&server.uri());
    let gate = FixedRateGate::new(1000);
    let ctx = UpdateContext::new(&db, &client, &gate);

    store::users::insert(&db, seed_user("stale", 0, 10))
        .await
        .expect("seed stale");
    store::users::insert(&db, seed_user("fresh", 0, 1))
        .await
        .expect("seed fresh");
    mount_minimal_user(&server, "stale").await;

    let outcome = refresh_stale(&ctx).await.expect("refresh");
    assert_eq!(outcome.processed, 1);
    assert_eq!(outcome.updated, 1);

    let stale = store::users::find_by_username(&db, "stale")
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(stale.status, UpdateStatus::Completed);
    assert!(stale.updated_at > (Utc::now() - Duration::days(1)).fixed_offset());
}

#[tokio::test]
async fn refresh_continues_past_individual_failures() {
    let server = MockServer::start().await;
    let db = test_db().await;
    let client = GithubClient::new("t")
        .expect("client")
        .with_base_url(&server.uri());
    let gate = FixedRateGate::new(1000);
    let ctx = UpdateContext::new(&db, &client, &gate);

    store::users::insert(&db, seed_user("vanished", 0, 20))
        .await
        .expect("seed");
    store::users::insert(&db, seed_user("alive", 0, 10))
        .await
        .expect("seed");

    // "vanished" 404s upstream; "alive" works.
    Mock::given(method("GET"))
        .and(path("/users/vanished"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_minimal_user(&server, "alive").await;

    let outcome = refresh_stale(&ctx).await.expect("refresh");
    assert_eq!(outcome.processed, 2);
    assert_eq!(outcome.updated, 1);
    assert!(!outcome.aborted);
}

#[tokio::test]
async fn ranking_rebuild_snapshots_and_ranks_everyone() {
    let db = test_db().await;

    store::users::insert(&db, seed_user("gold", 300, 1))
        .await
        .expect("seed");
    store::users::insert(&db, seed_user("silver", 200, 1))
        .await
        .expect("seed");
    store::users::insert(&db, seed_user("bronze", 100, 1))
        .await
        .expect("seed");

    let updated = rebuild_rankings(&db, &NullNotifier).await.expect("rebuild");
    assert_eq!(updated, 3);

    let snapshot = store::ranks::for_signal(&db, "total_score")
        .await
        .expect("snapshot");
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot[0].position, 1);
    assert_eq!(snapshot[0].score, 300);

    let users = store::users::all(&db).await.expect("users");
    let gold = users.iter().find(|u| u.username == "gold").expect("gold");
    assert_eq!(gold.current_rank, Some(1));
    assert_eq!(gold.tier, Tier::Challenger);

    let bronze = users.iter().find(|u| u.username == "bronze").expect("bronze");
    assert_eq!(bronze.current_rank, Some(3));
}
