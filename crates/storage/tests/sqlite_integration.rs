use chrono::Duration;
use ladders_core::model::{GameMode, Identity, Outcome, PlayerAnswer, Round, SessionSummary};
use ladders_core::numbers::RoundNumber;
use ladders_core::opponent::OpponentAttempt;
use ladders_core::time::fixed_now;
use storage::repository::{PlayerStatsRow, SessionSummaryRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_summary(
    identity: &Identity,
    mode: GameMode,
    answers: &[&str],
    opponent_hits: &[bool],
    completed_minutes_ago: i64,
) -> SessionSummary {
    let rounds: Vec<Round> = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| {
            let attempt = mode
                .has_opponent()
                .then(|| OpponentAttempt::new(opponent_hits[i % opponent_hits.len()], 4.0));
            let player_answer = if *answer == "-" {
                PlayerAnswer::Skipped
            } else {
                PlayerAnswer::from_submission(answer)
            };
            Round::close(
                u32::try_from(i + 1).unwrap(),
                RoundNumber::parse("729").unwrap(),
                player_answer,
                3.0,
                attempt,
            )
        })
        .collect();
    let completed_at = fixed_now() - Duration::minutes(completed_minutes_ago);
    SessionSummary::from_rounds(
        identity.clone(),
        mode,
        u32::try_from(answers.len()).unwrap(),
        rounds,
        mode.has_opponent().then(|| "Opponent".to_owned()),
        completed_at - Duration::minutes(2),
        completed_at,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_keeps_every_summary_field() {
    let repo = connect("memdb_roundtrip").await;
    let guest = Identity::new_guest();
    let summary = build_summary(&guest, GameMode::Duel, &["9", "-", "4"], &[true, false], 1);

    let id = repo.append_summary(&summary).await.unwrap();
    let fetched = repo.get_summary(id).await.unwrap();

    assert_eq!(fetched, summary);
    assert_eq!(fetched.rounds().len(), 3);
    assert_eq!(fetched.rounds()[1].recorded_answer(), "skipped");
    assert_eq!(fetched.opponent_score(), Some(15));
    assert_eq!(fetched.outcome(), Outcome::Loss);
    assert!(fetched.identity().is_guest());
}

#[tokio::test]
async fn sqlite_missing_summary_is_not_found() {
    let repo = connect("memdb_missing").await;
    assert!(matches!(
        repo.get_summary(404).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_lists_newest_first_with_filters() {
    let repo = connect("memdb_listing").await;
    let me = Identity::registered("alice").unwrap();
    let someone_else = Identity::registered("bob").unwrap();

    let oldest = repo
        .append_summary(&build_summary(&me, GameMode::Solo, &["9"], &[true], 90))
        .await
        .unwrap();
    let middle = repo
        .append_summary(&build_summary(&me, GameMode::Solo, &["1"], &[true], 30))
        .await
        .unwrap();
    let newest = repo
        .append_summary(&build_summary(&me, GameMode::Tournament, &["9"], &[false], 5))
        .await
        .unwrap();
    repo.append_summary(&build_summary(&someone_else, GameMode::Solo, &["9"], &[true], 1))
        .await
        .unwrap();

    let rows = repo.list_summary_rows(&me, None, 10).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![newest, middle, oldest]);

    let recent = repo
        .list_summary_rows(&me, Some(fixed_now() - Duration::minutes(45)), 10)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);

    let limited = repo.list_summaries(&me, None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].mode(), GameMode::Tournament);
    assert_eq!(limited[0].outcome(), Outcome::Win);
}

#[tokio::test]
async fn sqlite_leaderboard_ranks_players() {
    let repo = connect("memdb_leaderboard").await;
    let alice = Identity::registered("alice").unwrap();
    let bob = Identity::registered("bob").unwrap();
    let carol = Identity::registered("carol").unwrap();

    repo.append_summary(&build_summary(&alice, GameMode::Solo, &["9", "9"], &[true], 10))
        .await
        .unwrap();
    repo.append_summary(&build_summary(&alice, GameMode::Solo, &["1", "-"], &[true], 9))
        .await
        .unwrap();
    repo.append_summary(&build_summary(&bob, GameMode::Solo, &["9", "9"], &[true], 8))
        .await
        .unwrap();
    repo.append_summary(&build_summary(&carol, GameMode::Duel, &["9", "9", "9"], &[true], 7))
        .await
        .unwrap();

    let board = repo.leaderboard(None, 10).await.unwrap();
    let order: Vec<&str> = board.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(order, vec!["carol", "alice", "bob"]);
    assert_eq!(board[0].best_score, 30);
    assert_eq!(board[1].games_played, 2);
    assert!((board[1].average_accuracy - 50.0).abs() < 1e-9);

    let solo_top = repo.leaderboard(Some(GameMode::Solo), 1).await.unwrap();
    assert_eq!(solo_top.len(), 1);
    assert_eq!(solo_top[0].identity.as_str(), "alice");

    let tournament = repo.leaderboard(Some(GameMode::Tournament), 10).await.unwrap();
    assert!(tournament.is_empty());
}

#[tokio::test]
async fn sqlite_player_stats_match_in_memory_fold() {
    let repo = connect("memdb_player_stats").await;
    let me = Identity::registered("alice").unwrap();

    let games = [
        build_summary(&me, GameMode::Duel, &["9", "9"], &[false], 30),
        build_summary(&me, GameMode::Duel, &["1", "-"], &[true], 20),
        build_summary(&me, GameMode::Tournament, &["9", "1"], &[true, false], 10),
        build_summary(&me, GameMode::Solo, &["-", "-"], &[true], 5),
    ];
    for game in &games {
        repo.append_summary(game).await.unwrap();
    }

    let stats = repo.player_stats(&me).await.unwrap();
    let expected = PlayerStatsRow::from_summaries(games.iter());
    assert_eq!(stats.games_played, 4);
    assert_eq!(stats.wins, expected.wins);
    assert_eq!(stats.losses, expected.losses);
    assert_eq!(stats.draws, expected.draws);
    assert_eq!(stats.best_score, Some(20));
    assert_eq!(stats.total_score, expected.total_score);
    assert!((stats.average_accuracy - expected.average_accuracy).abs() < 1e-9);
    assert!((stats.average_response_secs - 3.0).abs() < 1e-9);

    let empty = repo
        .player_stats(&Identity::registered("nobody").unwrap())
        .await
        .unwrap();
    assert_eq!(empty, PlayerStatsRow::default());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let me = Identity::registered("alice").unwrap();
    repo.append_summary(&build_summary(&me, GameMode::Solo, &["9"], &[true], 1))
        .await
        .unwrap();
    assert_eq!(repo.list_summaries(&me, None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_rejects_rows_that_disagree_with_the_scoring_rules() {
    let repo = connect("memdb_tampered").await;
    let alice = Identity::registered("alice").unwrap();
    let summary = build_summary(&alice, GameMode::Duel, &["9", "4"], &[true], 1);
    let forged_opponent = repo.append_summary(&summary).await.unwrap();
    let forged_round = repo.append_summary(&summary).await.unwrap();

    sqlx::query("UPDATE game_sessions SET opponent_score = 999 WHERE id = ?1")
        .bind(forged_opponent)
        .execute(repo.pool())
        .await
        .unwrap();
    assert!(matches!(
        repo.get_summary(forged_opponent).await,
        Err(StorageError::Serialization(_))
    ));

    let rounds_json: String =
        sqlx::query_scalar("SELECT rounds_json FROM game_sessions WHERE id = ?1")
            .bind(forged_round)
            .fetch_one(repo.pool())
            .await
            .unwrap();
    let forged = rounds_json.replacen("\"correct_answer\":9", "\"correct_answer\":5", 1);
    assert_ne!(forged, rounds_json);
    sqlx::query("UPDATE game_sessions SET rounds_json = ?1 WHERE id = ?2")
        .bind(forged)
        .bind(forged_round)
        .execute(repo.pool())
        .await
        .unwrap();
    assert!(matches!(
        repo.get_summary(forged_round).await,
        Err(StorageError::Serialization(_))
    ));
    assert!(repo.list_summaries(&alice, None, 10).await.is_err());
}
