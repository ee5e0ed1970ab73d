//! Leaderboard HTTP endpoints, free of any particular server.
//!
//! Handlers take the request method and raw body and hand back a status code
//! with a JSON body; `src/bin/leaderboard.rs` wires them to a socket.

use crate::error::ApiError;
use crate::leaderboard::{ScoreEntry, ScoreStore, LEADERBOARD_SIZE};
use log::{debug, info};
use serde_json::{json, Value};

pub const GET_SCORES_PATH: &str = "/api/get-scores";
pub const SUBMIT_SCORE_PATH: &str = "/api/submit-score";

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let body = match &err {
            ApiError::Store(_) => json!({ "error": err.to_string() }),
            ApiError::Validation | ApiError::Method => json!({ "message": err.to_string() }),
        };
        Self {
            status: err.status(),
            body,
        }
    }
}

/// `GET /api/get-scores`: the top seven, best first.
pub fn get_scores(store: &dyn ScoreStore) -> ApiResponse {
    match store.top_scores(LEADERBOARD_SIZE) {
        Ok(entries) => ApiResponse::ok(json!(entries)),
        Err(err) => ApiError::from(err).into(),
    }
}

/// `POST /api/submit-score` with `{"name": string, "score": number}`.
pub fn submit_score(store: &mut dyn ScoreStore, method: &str, body: &[u8]) -> ApiResponse {
    match try_submit(store, method, body) {
        Ok(()) => ApiResponse::ok(json!({ "message": "Score submitted" })),
        Err(err) => err.into(),
    }
}

fn try_submit(store: &mut dyn ScoreStore, method: &str, body: &[u8]) -> Result<(), ApiError> {
    if !method.eq_ignore_ascii_case("POST") {
        return Err(ApiError::Method);
    }
    let entry = parse_submission(body)?;
    info!("recording {} for {}", entry.score, entry.name);
    store.submit(entry)?;
    Ok(())
}

fn parse_submission(body: &[u8]) -> Result<ScoreEntry, ApiError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| ApiError::Validation)?;
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::Validation)?;
    let score = payload
        .get("score")
        .and_then(Value::as_u64)
        .ok_or(ApiError::Validation)?;
    Ok(ScoreEntry::new(name, score))
}

/// Dispatches on the path; the query string is ignored.
pub fn route(store: &mut dyn ScoreStore, method: &str, url: &str, body: &[u8]) -> ApiResponse {
    let path = url.split('?').next().unwrap_or(url);
    debug!("{} {}", method, path);
    match path {
        GET_SCORES_PATH => get_scores(store),
        SUBMIT_SCORE_PATH => submit_score(store, method, body),
        _ => ApiResponse {
            status: 404,
            body: json!({ "error": "Not found" }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::leaderboard::MemoryStore;

    struct Broken;

    impl ScoreStore for Broken {
        fn top_scores(&self, _limit: usize) -> Result<Vec<ScoreEntry>, StoreError> {
            Err(StoreError::Network("database unavailable".into()))
        }

        fn submit(&mut self, _entry: ScoreEntry) -> Result<(), StoreError> {
            Err(StoreError::Network("database unavailable".into()))
        }
    }

    #[test]
    fn submit_requires_post() {
        let mut store = MemoryStore::new();
        let reply = submit_score(&mut store, "GET", br#"{"name":"AAA","score":1}"#);
        assert_eq!(reply.status, 405);
        assert_eq!(reply.body, json!({ "message": "Only POST requests allowed" }));
        assert!(store.is_empty());
    }

    #[test]
    fn submit_rejects_bad_payloads() {
        let mut store = MemoryStore::new();
        let bodies: [&[u8]; 7] = [
            br#"{"name":"AAA","score":"high"}"#,
            br#"{"score":10}"#,
            br#"{"name":"","score":10}"#,
            br#"{"name":"AAA","score":-5}"#,
            br#"{"name":"AAA","score":1.5}"#,
            br#"{"name":42,"score":10}"#,
            b"not json",
        ];
        for body in bodies {
            let reply = submit_score(&mut store, "POST", body);
            assert_eq!(reply.status, 400, "{}", String::from_utf8_lossy(body));
            assert_eq!(reply.body, json!({ "message": "Invalid name or score" }));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn store_failures_surface_as_500() {
        let reply = get_scores(&Broken);
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body, json!({ "error": "network error: database unavailable" }));

        let reply = submit_score(&mut Broken, "POST", br#"{"name":"AAA","score":1}"#);
        assert_eq!(reply.status, 500);
        assert!(reply.body.get("error").is_some());
    }

    #[test]
    fn route_dispatches_by_path() {
        let mut store = MemoryStore::new();
        let reply = route(&mut store, "POST", "/api/submit-score", br#"{"name":"AAA","score":7}"#);
        assert_eq!(reply, ApiResponse::ok(json!({ "message": "Score submitted" })));

        let reply = route(&mut store, "GET", "/api/get-scores?fresh=1", b"");
        assert_eq!(reply.body, json!([{ "name": "AAA", "score": 7 }]));

        let reply = route(&mut store, "GET", "/api/elsewhere", b"");
        assert_eq!(reply.status, 404);
    }
}
