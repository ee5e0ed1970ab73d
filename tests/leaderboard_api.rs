use maze_chase::api::{route, GET_SCORES_PATH, SUBMIT_SCORE_PATH};
use maze_chase::leaderboard::{LocalStore, MemoryStore, ScoreEntry, ScoreStore, LEADERBOARD_SIZE};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;

fn scratch_store(name: &str) -> (LocalStore, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "maze_chase_api_{}_{}.json",
        std::process::id(),
        name
    ));
    let _ = fs::remove_file(&path);
    (LocalStore::new(&path), path)
}

fn submit(store: &mut dyn ScoreStore, body: Value) -> u16 {
    route(store, "POST", SUBMIT_SCORE_PATH, body.to_string().as_bytes()).status
}

fn scores(store: &mut dyn ScoreStore) -> Value {
    let reply = route(store, "GET", GET_SCORES_PATH, b"");
    assert_eq!(reply.status, 200);
    reply.body
}

#[test]
fn submitted_scores_come_back_best_first() {
    let (mut store, path) = scratch_store("order");
    assert_eq!(submit(&mut store, json!({ "name": "AAA", "score": 100 })), 200);
    assert_eq!(submit(&mut store, json!({ "name": "BBB", "score": 50 })), 200);
    assert_eq!(
        scores(&mut store),
        json!([{ "name": "AAA", "score": 100 }, { "name": "BBB", "score": 50 }])
    );
    fs::remove_file(&path).unwrap();
}

#[test]
fn string_score_is_rejected_without_writing() {
    let (mut store, path) = scratch_store("reject");
    assert_eq!(submit(&mut store, json!({ "name": "AAA", "score": "high" })), 400);
    assert_eq!(scores(&mut store), json!([]));
    assert!(!path.exists());
}

#[test]
fn only_the_top_seven_are_served() {
    let mut store = MemoryStore::new();
    for (i, score) in [30, 80, 10, 70, 20, 60, 50, 40].into_iter().enumerate() {
        let name = format!("P{}", i);
        assert_eq!(submit(&mut store, json!({ "name": name, "score": score })), 200);
    }
    let body = scores(&mut store);
    let served: Vec<ScoreEntry> = serde_json::from_value(body).unwrap();
    assert_eq!(served.len(), LEADERBOARD_SIZE);
    let values: Vec<u64> = served.iter().map(|e| e.score).collect();
    assert_eq!(values, vec![80, 70, 60, 50, 40, 30, 20]);
    assert_eq!(store.len(), 8);
}

#[test]
fn local_fallback_matches_the_endpoints() {
    let (mut store, path) = scratch_store("fallback");
    store.submit(ScoreEntry::new("AAA", 100)).unwrap();
    store.submit(ScoreEntry::new("BBB", 50)).unwrap();
    assert_eq!(
        store.top_scores(LEADERBOARD_SIZE).unwrap(),
        vec![ScoreEntry::new("AAA", 100), ScoreEntry::new("BBB", 50)]
    );
    fs::remove_file(&path).unwrap();
}
