use super::*;
use crate::errors::is_unique_violation;
use crate::traits::store_prelude::*;

async fn setup_test_store() -> (SqliteStateStore, tempfile::NamedTempFile) {
    let db_file = tempfile::NamedTempFile::new().unwrap();
    let store = SqliteStateStore::new(db_file.path().to_str().unwrap())
        .await
        .unwrap();
    (store, db_file)
}

fn make_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: Some(username.to_string()),
        email: email.to_string(),
        password_hash: Some("$2b$12$fakehash".to_string()),
    }
}

fn day(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[tokio::test]
async fn create_and_fetch_user() {
    let (store, _db) = setup_test_store().await;

    let created = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    assert!(created.id > 0);

    let by_id = store.get_user(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@mouritech.com");
    assert_eq!(by_id.username.as_deref(), Some("alice"));
    assert!(!by_id.is_sso_only());

    let by_email = store
        .get_user_by_email("alice@mouritech.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, created.id);

    let by_username = store.get_user_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(store.get_user(9999).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_unique_violation() {
    let (store, _db) = setup_test_store().await;

    store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    let err = store
        .create_user(&make_user("alice2", "alice@mouritech.com"))
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));
}

#[tokio::test]
async fn sso_only_user_has_no_password() {
    let (store, _db) = setup_test_store().await;

    let user = store
        .create_user(&NewUser {
            username: Some("bob".to_string()),
            email: "bob@mouritech.com".to_string(),
            password_hash: None,
        })
        .await
        .unwrap();
    assert!(user.is_sso_only());

    store
        .set_password_hash(user.id, "$2b$12$newhash")
        .await
        .unwrap();
    let reloaded = store.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash.as_deref(), Some("$2b$12$newhash"));
}

#[tokio::test]
async fn provider_links_enforce_uniqueness() {
    let (store, _db) = setup_test_store().await;

    let alice = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    let bob = store
        .create_user(&make_user("bob", "bob@mouritech.com"))
        .await
        .unwrap();

    let link = store
        .create_provider_link(alice.id, "google", "sub-123")
        .await
        .unwrap();
    assert_eq!(link.user_id, alice.id);

    let found = store
        .get_provider_link("google", "sub-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, link.id);

    // Same external identity cannot attach to a second user.
    let err = store
        .create_provider_link(bob.id, "google", "sub-123")
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    // A user links at most one identity per provider.
    let err = store
        .create_provider_link(alice.id, "google", "sub-456")
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    let links = store.list_provider_links_for_user(alice.id).await.unwrap();
    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn goal_crud_is_owner_scoped() {
    let (store, _db) = setup_test_store().await;

    let alice = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    let bob = store
        .create_user(&make_user("bob", "bob@mouritech.com"))
        .await
        .unwrap();

    let goal = store
        .create_goal(&NewGoal {
            user_id: alice.id,
            title: "Read 30 books".to_string(),
            total_days: 30,
            start_date: day("2024-01-01"),
        })
        .await
        .unwrap();
    assert_eq!(goal.current_streak, 0);
    assert_eq!(goal.longest_streak, 0);

    assert!(store
        .get_goal_for_user(goal.id, alice.id)
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get_goal_for_user(goal.id, bob.id)
        .await
        .unwrap()
        .is_none());

    let goals = store.list_goals_for_user(alice.id).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].start_date, day("2024-01-01"));
    assert!(store.list_goals_for_user(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn subgoal_names_unique_within_goal_only() {
    let (store, _db) = setup_test_store().await;

    let alice = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    let goal_a = store
        .create_goal(&NewGoal {
            user_id: alice.id,
            title: "Goal A".to_string(),
            total_days: 10,
            start_date: day("2024-01-01"),
        })
        .await
        .unwrap();
    let goal_b = store
        .create_goal(&NewGoal {
            user_id: alice.id,
            title: "Goal B".to_string(),
            total_days: 10,
            start_date: day("2024-01-01"),
        })
        .await
        .unwrap();

    store
        .create_subgoal(&NewSubGoal {
            goal_id: goal_a.id,
            name: "Read 10 pages".to_string(),
            weight: 1.0,
        })
        .await
        .unwrap();

    let err = store
        .create_subgoal(&NewSubGoal {
            goal_id: goal_a.id,
            name: "Read 10 pages".to_string(),
            weight: 2.0,
        })
        .await
        .unwrap_err();
    assert!(is_unique_violation(&err));

    // Same name under a different goal of the same owner is fine.
    store
        .create_subgoal(&NewSubGoal {
            goal_id: goal_b.id,
            name: "Read 10 pages".to_string(),
            weight: 1.0,
        })
        .await
        .unwrap();

    let subgoals = store.list_subgoals_for_goal(goal_a.id).await.unwrap();
    assert_eq!(subgoals.len(), 1);
    assert_eq!(subgoals[0].weight, 1.0);
}

#[tokio::test]
async fn completion_ledger_one_row_per_day() {
    let (store, _db) = setup_test_store().await;

    let alice = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    let bob = store
        .create_user(&make_user("bob", "bob@mouritech.com"))
        .await
        .unwrap();
    let goal = store
        .create_goal(&NewGoal {
            user_id: alice.id,
            title: "Goal".to_string(),
            total_days: 10,
            start_date: day("2024-01-01"),
        })
        .await
        .unwrap();
    let subgoal = store
        .create_subgoal(&NewSubGoal {
            goal_id: goal.id,
            name: "Read 10 pages".to_string(),
            weight: 1.0,
        })
        .await
        .unwrap();

    // Ownership join: visible to alice, not bob.
    assert!(store
        .get_subgoal_for_user(subgoal.id, alice.id)
        .await
        .unwrap()
        .is_some());
    assert!(store
        .get_subgoal_for_user(subgoal.id, bob.id)
        .await
        .unwrap()
        .is_none());

    let d = day("2024-01-05");
    assert!(store.get_completion(subgoal.id, d).await.unwrap().is_none());

    let completion = store.insert_completion(subgoal.id, d).await.unwrap();
    assert!(completion.completed);
    assert_eq!(completion.completed_on, d);

    let found = store.get_completion(subgoal.id, d).await.unwrap().unwrap();
    assert_eq!(found.id, completion.id);

    // Second insert for the same day violates the ledger constraint.
    let err = store.insert_completion(subgoal.id, d).await.unwrap_err();
    assert!(is_unique_violation(&err));

    // A different day is a fresh row.
    store
        .insert_completion(subgoal.id, day("2024-01-06"))
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_user_cascades_to_everything() {
    let (store, _db) = setup_test_store().await;

    let alice = store
        .create_user(&make_user("alice", "alice@mouritech.com"))
        .await
        .unwrap();
    store
        .create_provider_link(alice.id, "google", "sub-123")
        .await
        .unwrap();
    let goal = store
        .create_goal(&NewGoal {
            user_id: alice.id,
            title: "Goal".to_string(),
            total_days: 10,
            start_date: day("2024-01-01"),
        })
        .await
        .unwrap();
    let subgoal = store
        .create_subgoal(&NewSubGoal {
            goal_id: goal.id,
            name: "Sub".to_string(),
            weight: 1.0,
        })
        .await
        .unwrap();
    store
        .insert_completion(subgoal.id, day("2024-01-02"))
        .await
        .unwrap();

    store.delete_user(alice.id).await.unwrap();

    for table in [
        "users",
        "user_auth_providers",
        "goals",
        "subgoals",
        "subgoal_daily_completion",
    ] {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
            .fetch_one(store.pool())
            .await
            .unwrap();
        let n: i64 = row.get("n");
        assert_eq!(n, 0, "expected {} to be empty after cascade", table);
    }
}
