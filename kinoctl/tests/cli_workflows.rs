//! kinoctl against an in-process kinoknecht server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use assert_cmd::cargo::cargo_bin_cmd;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use predicates::prelude::*;

/// Video file whose episode creation the server refuses.
const BROKEN_FILE: &str = "13";

#[derive(Clone)]
struct Server {
    next_id: Arc<AtomicU64>,
}

async fn create(State(server): State<Server>, body: String) -> Response {
    let broken = url::form_urlencoded::parse(body.as_bytes())
        .any(|(key, value)| key == "vfiles[]" && value == BROKEN_FILE);
    if broken {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no such video file")
            .into_response();
    }
    server
        .next_id
        .fetch_add(1, Ordering::SeqCst)
        .to_string()
        .into_response()
}

// The real server answers a show link with a bare boolean.
async fn add_to_show() -> &'static str {
    "True"
}

async fn spawn_server() -> SocketAddr {
    let state = Server {
        next_id: Arc::new(AtomicU64::new(200)),
    };
    let app = Router::new()
        .route("/_create", post(create))
        .route("/_add_to_show", post(add_to_show))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn kinoctl(addr: SocketAddr, args: &[&str]) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("kinoctl");
    cmd.env_remove("KINOKNECHT_BASE_URL")
        .env_remove("KINOKNECHT_TIMEOUT_SECS")
        .env("RUST_LOG", "off")
        .args(["--base-url", &format!("http://{addr}"), "--timeout", "5"])
        .args(args);
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn linked_episodes_print_the_show_page() {
    let addr = spawn_server().await;

    let mut cmd = kinoctl(addr, &["add-to-show", "7", "12"]);
    tokio::task::spawn_blocking(move || {
        cmd.assert().success().stdout(predicate::str::contains(format!(
            "http://{addr}/details/show/7"
        )));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn one_failed_episode_fails_the_command() {
    let addr = spawn_server().await;

    let mut cmd = kinoctl(addr, &["add-to-show", "7", "12", BROKEN_FILE]);
    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains(
                "1 of 2 video files were not linked to show 7",
            ))
            .stdout(predicate::str::contains("/details/show/7").not());
    })
    .await
    .unwrap();
}
