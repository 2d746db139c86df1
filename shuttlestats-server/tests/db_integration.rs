//! Database integration tests
//!
//! These wipe every table in the target database. Point `DATABASE_URL` at a
//! scratch database and run with:
//! `DATABASE_URL=postgres://... cargo test -p shuttlestats-server -- --ignored`

use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use shuttlestats_core::{derive_outcome, MatchResult, OpponentName, Pairing, PlayerName, SetScore};
use shuttlestats_server::db::{
    DbError, MatchRepo, NewMatch, PairRepo, PlayerRepo, StatsRepo,
};
use shuttlestats_server::{connect, migrations};

/// Tests share one database; run them one at a time.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn setup() -> (MutexGuard<'static, ()>, PgPool) {
    let guard = DB_LOCK.lock().await;
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = connect(&url, 2).await.expect("pool creation failed");
    migrations::run(&pool).await.expect("migrations failed");
    migrations::clear(&pool).await.expect("clear failed");
    (guard, pool)
}

#[tokio::test]
#[ignore = "requires database"]
async fn pool_acquires_connection() {
    let (_guard, pool) = setup().await;
    let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
    assert_eq!(one, 1);
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_match(on: NaiveDate, pairing: Option<&str>, opponent: &str, sets: &[(i64, i64)]) -> NewMatch {
    let scores: Vec<SetScore> = sets
        .iter()
        .enumerate()
        .map(|(i, (f, a))| SetScore::new(i + 1, *f, *a).unwrap())
        .collect();
    NewMatch {
        date: on,
        pairing: pairing.map(str::to_owned),
        opponent: OpponentName::new(opponent).unwrap(),
        outcome: derive_outcome(&scores).unwrap(),
    }
}

async fn seed_pair(pool: &PgPool, p1: &str, p2: &str) -> i32 {
    let players = PlayerRepo::new(pool);
    for name in [p1, p2] {
        match players.create(&PlayerName::new(name).unwrap()).await {
            Ok(_) => {}
            Err(e) if e.is_conflict() => {}
            Err(e) => panic!("player create failed: {e}"),
        }
    }
    PairRepo::new(pool)
        .create(&Pairing::new(p1, p2).unwrap())
        .await
        .unwrap()
        .pair
        .id
}

#[tokio::test]
#[ignore = "requires database"]
async fn match_write_round_trips() {
    let (_guard, pool) = setup().await;
    let pair_id = seed_pair(&pool, "Alice", "Bob").await;

    let repo = MatchRepo::new(&pool);
    let created = repo
        .create(&new_match(
            date(2024, 3, 9),
            Some("Bob / Alice"),
            "Riverside",
            &[(21, 15), (18, 21), (21, 19)],
        ))
        .await
        .unwrap();

    assert_eq!(created.pair_id, Some(pair_id));
    assert_eq!(created.pairing.as_deref(), Some("Alice / Bob"));
    assert_eq!(created.result, MatchResult::Win);
    assert_eq!((created.sets_for, created.sets_against), (2, 1));
    assert_eq!((created.points_for, created.points_against), (60, 55));
    let numbers: Vec<i32> = created.sets.iter().map(|s| s.set_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.date, date(2024, 3, 9));
    assert_eq!(fetched.opponent, "Riverside");
    assert_eq!(fetched.sets, created.sets);
}

#[tokio::test]
#[ignore = "requires database"]
async fn blank_sets_are_not_persisted() {
    let (_guard, pool) = setup().await;

    let created = MatchRepo::new(&pool)
        .create(&new_match(
            date(2024, 3, 9),
            None,
            "Riverside",
            &[(0, 0), (21, 10), (0, 0)],
        ))
        .await
        .unwrap();

    assert_eq!(created.sets.len(), 1);
    assert_eq!(created.sets[0].set_number, 1);
    assert_eq!((created.sets[0].points_for, created.sets[0].points_against), (21, 10));
    assert_eq!((created.sets_for, created.sets_against), (1, 0));

    let (stored,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM match_sets WHERE match_id = $1")
        .bind(created.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn unresolved_pairing_still_records_the_match() {
    let (_guard, pool) = setup().await;
    seed_pair(&pool, "Alice", "Bob").await;
    let repo = MatchRepo::new(&pool);

    for pairing in ["Alice / Zed", "Alice and Bob", "Alice / Alice"] {
        let created = repo
            .create(&new_match(date(2024, 3, 9), Some(pairing), "Riverside", &[(21, 5)]))
            .await
            .unwrap();
        assert_eq!(created.pair_id, None, "{pairing}");
        assert_eq!(created.pairing, None);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn team_totals_round_win_percent() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);

    for sets in [&[(21, 10)][..], &[(21, 19), (21, 17)][..], &[(10, 21)][..]] {
        repo.create(&new_match(date(2024, 3, 9), None, "Riverside", sets))
            .await
            .unwrap();
    }

    let totals = StatsRepo::new(&pool).team_totals().await.unwrap();
    assert_eq!(totals.total_matches, 3);
    assert_eq!((totals.wins, totals.losses, totals.draws), (2, 1, 0));
    assert_eq!(totals.win_percent, 0.6667);
    assert_eq!((totals.sets_for, totals.sets_against), (3, 1));
    assert_eq!((totals.points_for, totals.points_against), (73, 67));
}

#[tokio::test]
#[ignore = "requires database"]
async fn empty_database_reports_zeros() {
    let (_guard, pool) = setup().await;

    let totals = StatsRepo::new(&pool).team_totals().await.unwrap();
    assert_eq!(totals.total_matches, 0);
    assert_eq!(totals.win_percent, 0.0);
    assert!(MatchRepo::new(&pool).list_groups().await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn deleting_a_player_removes_pairs_but_keeps_matches() {
    let (_guard, pool) = setup().await;
    seed_pair(&pool, "Alice", "Bob").await;

    let matches = MatchRepo::new(&pool);
    let created = matches
        .create(&new_match(date(2024, 3, 9), Some("Alice / Bob"), "Riverside", &[(21, 5)]))
        .await
        .unwrap();
    assert!(created.pair_id.is_some());

    let players = PlayerRepo::new(&pool);
    let alice = players
        .list_with_stats()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Alice")
        .unwrap();
    players.delete(alice.id).await.unwrap();

    assert!(PairRepo::new(&pool).list_with_stats().await.unwrap().is_empty());

    let kept = matches.get(created.id).await.unwrap();
    assert_eq!(kept.pair_id, None);
    assert_eq!(kept.pairing, None);
    assert_eq!(kept.result, MatchResult::Win);
    assert_eq!(kept.sets.len(), 1);

    let err = players.delete(alice.id).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "player", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_pair_conflicts_in_either_order() {
    let (_guard, pool) = setup().await;
    seed_pair(&pool, "Alice", "Bob").await;

    let pairs = PairRepo::new(&pool);
    for (p1, p2) in [("Alice", "Bob"), ("Bob", "Alice")] {
        let err = pairs.create(&Pairing::new(p1, p2).unwrap()).await.unwrap_err();
        assert!(err.is_conflict(), "{p1} / {p2}: {err}");
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn pair_with_unknown_player_is_not_found() {
    let (_guard, pool) = setup().await;
    PlayerRepo::new(&pool)
        .create(&PlayerName::new("Alice").unwrap())
        .await
        .unwrap();

    let err = PairRepo::new(&pool)
        .create(&Pairing::new("Alice", "Zed").unwrap())
        .await
        .unwrap_err();
    match err {
        DbError::NotFound { resource, id } => {
            assert_eq!(resource, "player");
            assert_eq!(id, "Zed");
        }
        other => panic!("expected NotFound, got {other}"),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_player_conflicts() {
    let (_guard, pool) = setup().await;
    let players = PlayerRepo::new(&pool);
    players.create(&PlayerName::new("Alice").unwrap()).await.unwrap();

    let err = players
        .create(&PlayerName::new("  Alice ").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
#[ignore = "requires database"]
async fn player_and_pair_stats_aggregate_over_matches() {
    let (_guard, pool) = setup().await;
    seed_pair(&pool, "Alice", "Bob").await;
    seed_pair(&pool, "Alice", "Cara").await;

    let repo = MatchRepo::new(&pool);
    repo.create(&new_match(date(2024, 3, 9), Some("Alice / Bob"), "Riverside", &[(21, 15), (21, 18)]))
        .await
        .unwrap();
    repo.create(&new_match(date(2024, 3, 16), Some("Alice / Cara"), "Hillside", &[(15, 21), (21, 19), (18, 21)]))
        .await
        .unwrap();

    let pairs = PairRepo::new(&pool).list_with_stats().await.unwrap();
    let names: Vec<String> = pairs.iter().map(|p| p.pair.display_name()).collect();
    assert_eq!(names, vec!["Alice / Bob", "Alice / Cara"]);
    assert_eq!(pairs[0].stats.games_for, 1);
    assert_eq!(pairs[0].stats.set_win_percent, 1.0);
    assert_eq!(pairs[1].stats.games_against, 1);
    assert_eq!(pairs[1].stats.set_win_percent, 0.3333);

    let players = PlayerRepo::new(&pool).list_with_stats().await.unwrap();
    let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Cara"]);

    let alice = &players[0].stats;
    assert_eq!(alice.games_played, 2);
    assert_eq!(alice.game_win_percent, 0.5);
    assert_eq!((alice.sets_won, alice.sets_lost), (3, 2));
    assert_eq!((alice.points_for, alice.points_against), (96, 94));

    let bob = &players[1].stats;
    assert_eq!(bob.games_played, 1);
    assert_eq!(bob.games_for, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn matches_group_by_date_and_opponent() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);

    let first = repo
        .create(&new_match(date(2024, 3, 9), None, "Riverside", &[(21, 15)]))
        .await
        .unwrap();
    let second = repo
        .create(&new_match(date(2024, 3, 9), None, "Riverside", &[(15, 21), (21, 19), (19, 21)]))
        .await
        .unwrap();
    repo.create(&new_match(date(2024, 3, 16), None, "Hillside", &[(21, 1)]))
        .await
        .unwrap();

    let groups = repo.list_groups().await.unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].opponent, "Hillside");

    let riverside = &groups[1];
    assert_eq!(riverside.match_ids, vec![first.id, second.id]);
    assert_eq!((riverside.games_for, riverside.games_against, riverside.games_drawn), (1, 1, 0));
    assert_eq!((riverside.sets_for, riverside.sets_against), (2, 2));
    let order: Vec<(i32, i32)> = riverside.sets.iter().map(|s| (s.match_id, s.set_number)).collect();
    assert_eq!(
        order,
        vec![(first.id, 1), (second.id, 1), (second.id, 2), (second.id, 3)]
    );

    let games = repo.list().await.unwrap();
    let ids: Vec<i32> = games.iter().map(|m| m.id).collect();
    assert_eq!(ids[1..], [second.id, first.id]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn replace_recomputes_from_new_sets() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);

    let created = repo
        .create(&new_match(date(2024, 3, 9), None, "Riverside", &[(21, 15), (21, 17)]))
        .await
        .unwrap();
    let replaced = repo
        .replace(created.id, &new_match(date(2024, 3, 10), None, "Hillside", &[(12, 21)]))
        .await
        .unwrap();

    assert_eq!(replaced.id, created.id);
    assert_eq!(replaced.date, date(2024, 3, 10));
    assert_eq!(replaced.result, MatchResult::Loss);
    assert_eq!((replaced.sets_for, replaced.sets_against), (0, 1));
    assert_eq!(replaced.sets.len(), 1);

    let err = repo
        .replace(created.id + 1000, &new_match(date(2024, 3, 10), None, "Hillside", &[(12, 21)]))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound { resource: "match", .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn deleting_a_match_removes_its_sets() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);

    let created = repo
        .create(&new_match(date(2024, 3, 9), None, "Riverside", &[(21, 15), (21, 17)]))
        .await
        .unwrap();
    repo.delete(created.id).await.unwrap();

    assert!(matches!(repo.get(created.id).await, Err(DbError::NotFound { .. })));
    let (orphans,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM match_sets")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphans, 0);
}

async fn row_counts(pool: &PgPool) -> (i64, i64) {
    let (matches,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await
        .unwrap();
    let (sets,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM match_sets")
        .fetch_one(pool)
        .await
        .unwrap();
    (matches, sets)
}

/// A match whose second set reuses set number 1, so the second set insert
/// hits `UNIQUE (match_id, set_number)` after the match row is written.
fn clashing_sets(on: NaiveDate) -> NewMatch {
    let mut new = new_match(on, None, "Riverside", &[(21, 15), (21, 17)]);
    new.outcome.sets[1].set_number = 1;
    new
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_create_leaves_no_rows() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);
    repo.create(&new_match(date(2024, 3, 2), None, "Hillside", &[(21, 3)]))
        .await
        .unwrap();
    let before = row_counts(&pool).await;

    let err = repo.create(&clashing_sets(date(2024, 3, 9))).await.unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)), "{err}");

    assert_eq!(row_counts(&pool).await, before);
    assert_eq!(repo.list().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn failed_replace_keeps_the_old_match() {
    let (_guard, pool) = setup().await;
    let repo = MatchRepo::new(&pool);
    let original = repo
        .create(&new_match(date(2024, 3, 2), None, "Hillside", &[(21, 3), (12, 21), (21, 19)]))
        .await
        .unwrap();
    let before = row_counts(&pool).await;

    let err = repo
        .replace(original.id, &clashing_sets(date(2024, 3, 9)))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Sqlx(_)), "{err}");

    assert_eq!(row_counts(&pool).await, before);
    let kept = repo.get(original.id).await.unwrap();
    assert_eq!(kept.date, date(2024, 3, 2));
    assert_eq!(kept.opponent, "Hillside");
    assert_eq!((kept.points_for, kept.points_against), (54, 43));
    assert_eq!(kept.sets, original.sets);
}
