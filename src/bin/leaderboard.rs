//! Serves `/api/get-scores` and `/api/submit-score` over HTTP, backed by a
//! JSON score file.

use anyhow::anyhow;
use log::{info, warn};
use maze_chase::api;
use maze_chase::config::ServerSettings;
use maze_chase::leaderboard::LocalStore;
use std::io::Read;
use tiny_http::{Header, Response, Server};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = ServerSettings::from_env();
    let mut store = LocalStore::new(&settings.store_path);
    let server = Server::http(settings.addr.as_str())
        .map_err(|err| anyhow!("failed to bind {}: {}", settings.addr, err))?;
    let json_header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| anyhow!("invalid content-type header"))?;
    info!(
        "leaderboard listening on {} with scores in {}",
        settings.addr,
        store.path().display()
    );

    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if let Err(err) = request.as_reader().read_to_end(&mut body) {
            warn!("dropping request with unreadable body: {}", err);
            continue;
        }
        let reply = api::route(&mut store, request.method().as_str(), request.url(), &body);
        let response = Response::from_string(reply.body.to_string())
            .with_status_code(reply.status)
            .with_header(json_header.clone());
        if let Err(err) = request.respond(response) {
            warn!("failed to send response: {}", err);
        }
    }
    Ok(())
}
