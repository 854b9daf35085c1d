//! Shared test helpers: an in-process fake of the JADX HTTP API.
//!
//! The fake runs on its own thread with its own runtime, so both async
//! tests and blocking (runtime-free) tests can talk to it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::any;
use axum::Router;

/// One request as the fake decompiler saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub endpoint: String,
    pub query: HashMap<String, String>,
    pub body: String,
}

type Routes = Arc<HashMap<String, (u16, String)>>;
type Log = Arc<Mutex<Vec<Recorded>>>;

pub struct FakeJadx {
    pub base_url: String,
    log: Log,
}

impl FakeJadx {
    /// Serve `(endpoint, status, body)` triples under `/api/jadx/`.
    /// Unknown endpoints answer 404 with an empty body.
    pub fn start(routes: &[(&str, u16, &str)]) -> Self {
        let routes: Routes = Arc::new(
            routes
                .iter()
                .map(|(e, s, b)| (e.to_string(), (*s, b.to_string())))
                .collect(),
        );
        let log: Log = Arc::default();
        let app = Router::new()
            .route("/api/jadx/{endpoint}", any(handle))
            .with_state((routes, log.clone()));

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();

        Self {
            base_url: format!("http://{addr}/api/jadx"),
            log,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }
}

async fn handle(
    State((routes, log)): State<(Routes, Log)>,
    method: Method,
    Path(endpoint): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> (StatusCode, String) {
    log.lock().unwrap().push(Recorded {
        method,
        endpoint: endpoint.clone(),
        query,
        body,
    });
    match routes.get(&endpoint) {
        Some((status, body)) => (StatusCode::from_u16(*status).unwrap(), body.clone()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// A listener that accepts connections and never answers. Returns a base
/// URL pointing at it.
pub fn silent_jadx() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });
    format!("http://{addr}/api/jadx")
}
