use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use profile_form::form::CandidateSource;
use profile_form::{
    Collection, CollectionClient, Effect, FallbackCatalog, FetchError, FieldId, FormSettings,
    GeoDataset, InternalEvent, ProfileForm, TaskExecutor,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Minimal HTTP/1.1 responder: routes on the request target, one request
/// per connection.
async fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let target = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(path, _, _)| *path == target)
                    .map(|(_, status, body)| (*status, body.clone()))
                    .unwrap_or((404, r#"{"detail":"collection not found"}"#.to_string()));
                let response = format!(
                    "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

fn client(base: &str) -> CollectionClient {
    CollectionClient::new(base, Duration::from_secs(2)).expect("client")
}

fn form() -> ProfileForm {
    let catalog = FallbackCatalog {
        degrees: vec!["Bachelor".into()],
        institutions: vec!["MIT".into()],
        roles: vec!["Engineer".into()],
        companies: vec!["Google".into(), "Other".into()],
    };
    ProfileForm::new(Arc::new(GeoDataset::default()), catalog, FormSettings::default())
}

#[tokio::test]
async fn collection_items_are_normalized_with_timings() {
    let body = json!({
        "count": 4,
        "items": ["Acme", {"name": "Globex", "id": 1}, 7, {"label": "x"}],
        "serverTimeMs": 12
    });
    let base = serve(vec![("/companies", 200, body.to_string())]).await;
    let timed = client(&base)
        .fetch_collection_timed(Collection::Companies)
        .await
        .expect("fetch");
    assert_eq!(timed.items, ["Acme", "Globex"]);
    assert_eq!(timed.server_time_ms, Some(12));
}

#[tokio::test]
async fn failures_are_classified() {
    let base = serve(vec![
        ("/roles", 500, r#"{"detail":"boom"}"#.to_string()),
        ("/degrees", 200, json!({"count": 0, "items": []}).to_string()),
        ("/institutions", 200, "not json".to_string()),
    ])
    .await;
    let client = client(&base);
    assert!(matches!(
        client.fetch_collection(Collection::Roles).await,
        Err(FetchError::Status { .. })
    ));
    assert!(matches!(
        client.fetch_collection(Collection::Degrees).await,
        Err(FetchError::Empty(_))
    ));
    assert!(matches!(
        client.fetch_collection(Collection::Institutions).await,
        Err(FetchError::Malformed { .. })
    ));
}

#[tokio::test]
async fn keys_and_raw_key_lookup() {
    let base = serve(vec![
        (
            "/keys?pattern=comp*",
            200,
            json!({"count": 1, "keys": ["companies"]}).to_string(),
        ),
        (
            "/key/settings",
            200,
            json!({"key": "settings", "count": 1, "items": {"theme": "dark"}}).to_string(),
        ),
    ])
    .await;
    let client = client(&base);
    assert_eq!(client.list_keys(Some("comp*")).await.expect("keys"), ["companies"]);
    assert_eq!(
        client.fetch_key("settings").await.expect("key"),
        [json!({"theme": "dark"})]
    );
}

#[tokio::test]
async fn executor_results_flow_into_the_form() {
    let base = serve(vec![
        (
            "/companies",
            200,
            json!({"count": 2, "items": ["Acme", "Globex"], "serverTimeMs": 1}).to_string(),
        ),
        ("/roles", 503, "{}".to_string()),
    ])
    .await;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let executor = TaskExecutor::new(client(&base), event_tx);
    let mut form = form();

    let mut pending = 0;
    for field in [FieldId::Company, FieldId::Role] {
        if let Some(Effect::Async(task)) = form.refresh(field) {
            executor.spawn(task);
            pending += 1;
        }
    }
    while pending > 0 {
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("event in time")
            .expect("channel open");
        if let InternalEvent::TaskFinished { result, .. } = event {
            form.apply(result);
            pending -= 1;
        }
    }

    assert_eq!(form.source(FieldId::Company), Some(CandidateSource::Remote));
    assert_eq!(
        form.field(FieldId::Company).map(|f| f.candidates.len()),
        Some(2)
    );
    assert_eq!(form.source(FieldId::Role), Some(CandidateSource::Fallback));
    assert_eq!(form.field(FieldId::Role).map(|f| f.candidates.len()), Some(1));
}

#[tokio::test]
async fn unreachable_backend_keeps_every_fallback() {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let executor = TaskExecutor::new(client("http://127.0.0.1:9"), event_tx);
    let mut form = form();
    let effects = form.start();
    let mut pending = effects.len();
    for effect in effects {
        if let Effect::Async(task) = effect {
            executor.spawn(task);
        }
    }
    while pending > 0 {
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .expect("event in time")
            .expect("channel open");
        if let InternalEvent::TaskFinished { result, .. } = event {
            assert!(!form.apply(result));
            pending -= 1;
        }
    }
    for collection in [
        Collection::Degrees,
        Collection::Institutions,
        Collection::Roles,
        Collection::Companies,
    ] {
        assert_eq!(form.source(collection.field()), Some(CandidateSource::Fallback));
    }
}
