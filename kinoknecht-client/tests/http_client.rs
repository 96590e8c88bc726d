//! ApiClient against an in-process server mounted under a script root.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use kinoknecht_client::{
    ApiClient, CatalogApi, ClientConfig, ClientError, CreateRequest,
};
use kinoknecht_model::{Category, Endpoint, EpisodeId, ShowId, VideoFileId};
use parking_lot::Mutex;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Received {
    path: &'static str,
    fields: Vec<(String, String)>,
}

#[derive(Clone, Default)]
struct FakeServer {
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeServer {
    fn record(&self, path: &'static str, raw: &str) {
        let fields = url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        self.received.lock().push(Received { path, fields });
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().clone()
    }
}

async fn clean_name(
    State(server): State<FakeServer>,
    RawQuery(raw): RawQuery,
) -> Json<String> {
    server.record("/_get_clean_name", raw.as_deref().unwrap_or_default());
    Json("Some Movie".to_string())
}

async fn query_imdb(
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    match params.get("searchstr").map(String::as_str) {
        Some("boom") => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "imdb unreachable")
                .into_response();
        }
        Some("garbled") => return "not json".into_response(),
        _ => {}
    }
    Json(json!([
        {"imdbid": "0133093", "title": "The Matrix (1999)"},
        {"imdbid": "0234215", "title": "The Matrix Reloaded (2003)"}
    ]))
    .into_response()
}

async fn query(
    State(server): State<FakeServer>,
    RawQuery(raw): RawQuery,
) -> Json<serde_json::Value> {
    server.record("/_query", raw.as_deref().unwrap_or_default());
    Json(json!([{"id": 4, "title": "Seinfeld"}]))
}

async fn create(State(server): State<FakeServer>, body: String) -> String {
    server.record("/_create", &body);
    if body.contains("title=garbled") {
        return "\"unterminated".to_string();
    }
    "42\n".to_string()
}

async fn add_to_show(State(server): State<FakeServer>, body: String) -> String {
    server.record("/_add_to_show", &body);
    "\"5\"".to_string()
}

async fn spawn_server() -> (ApiClient, FakeServer) {
    let server = FakeServer::default();
    let routes = Router::new()
        .route("/_get_clean_name", get(clean_name))
        .route("/_query_imdb", get(query_imdb))
        .route("/_query", get(query))
        .route("/_create", post(create))
        .route("/_add_to_show", post(add_to_show))
        .with_state(server.clone());
    let app = Router::new().nest("/kino", routes);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ClientConfig::with_base_url(&format!("{addr}/kino/")).unwrap();
    (ApiClient::new(&config).unwrap(), server)
}

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn create_sends_repeated_bracketed_file_keys() {
    let (client, server) = spawn_server().await;

    let request = CreateRequest::movie(
        vec![VideoFileId::new("3").unwrap(), VideoFileId::new("8").unwrap()],
        "tt0133093".parse().unwrap(),
    )
    .unwrap();
    let id = client.create(&request).await.unwrap();

    assert_eq!(id, "42");
    assert_eq!(
        server.received(),
        vec![Received {
            path: "/_create",
            fields: pairs(&[
                ("type", "movie"),
                ("vfiles[]", "3"),
                ("vfiles[]", "8"),
                ("imdbid", "0133093"),
            ]),
        }]
    );
}

#[tokio::test]
async fn add_to_show_sends_episode_ids_and_unquotes_reply() {
    let (client, server) = spawn_server().await;

    let body = client
        .add_to_show(
            &[EpisodeId::new("11").unwrap(), EpisodeId::new("12").unwrap()],
            &ShowId::new("5").unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(body, "5");
    assert_eq!(
        server.received()[0].fields,
        pairs(&[
            ("episodeids[]", "11"),
            ("episodeids[]", "12"),
            ("showid", "5"),
        ])
    );
}

#[tokio::test]
async fn queries_encode_parameters_and_decode_json() {
    let (client, server) = spawn_server().await;

    let title = client
        .get_clean_name(&VideoFileId::new("17").unwrap())
        .await
        .unwrap();
    assert_eq!(title, "Some Movie");

    let shows = client.query(Category::Show, "sein feld").await.unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id.as_str(), "4");

    let movies = client.query_imdb("matrix").await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[1].imdbid.as_str(), "0234215");

    let received = server.received();
    assert_eq!(received[0].fields, pairs(&[("vfid", "17")]));
    assert_eq!(
        received[1].fields,
        pairs(&[("type", "show"), ("searchstr", "sein feld")])
    );
}

#[tokio::test]
async fn server_errors_surface_as_status() {
    let (client, _server) = spawn_server().await;

    let err = client.query_imdb("boom").await.unwrap_err();
    match err {
        ClientError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, Endpoint::QueryImdb);
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "imdb unreachable");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn malformed_replies_surface_as_decode_errors() {
    let (client, _server) = spawn_server().await;

    let err = client.query_imdb("garbled").await.unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::Decode {
                endpoint: Endpoint::QueryImdb,
                ..
            }
        ),
        "unexpected error {err:?}"
    );

    let err = client
        .create(&CreateRequest::show("garbled").unwrap())
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            ClientError::Decode {
                endpoint: Endpoint::Create,
                ..
            }
        ),
        "unexpected error {err:?}"
    );
}
