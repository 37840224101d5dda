#![cfg(feature = "server")]
//! End-to-end tests against a live server on an ephemeral port

use gridpage::ids::UuidGenerator;
use gridpage::server::{App, HttpServer, ServerHandle};
use gridpage::{ServerConfig, StorageBackend};
use std::sync::Arc;

const PAYLOAD: &str = r#"{
    "layout": [["header.0", "header.0"], ["p.0", "p.1"]],
    "content": { "header.0": "Arrivals" },
    "styles": { "p.1": "background:black;" },
    "resolution": { "width": 1920, "height": 1080 }
}"#;

fn start(storage: StorageBackend) -> (ServerHandle, String) {
    let config = ServerConfig {
        addr: "127.0.0.1:0".to_string(),
        workers: Some(2),
        storage,
        ..Default::default()
    };
    let store = config.storage.open().expect("open store");
    let app = App::new(&config, store, Arc::new(UuidGenerator));
    let server = HttpServer::bind(&config, app).expect("bind");
    let handle = server.spawn();
    let addr = handle.local_addr().expect("ip listener");
    (handle, format!("http://{}", addr))
}

fn post_generate(client: &reqwest::blocking::Client, base: &str, body: &str) -> reqwest::blocking::Response {
    client
        .post(format!("{}/generate", base))
        .header("Content-Type", "application/json")
        .body(body.to_string())
        .send()
        .expect("POST /generate")
}

#[test]
fn generate_and_view_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, base) = start(StorageBackend::Filesystem(dir.path().to_path_buf()));
    let client = reqwest::blocking::Client::new();

    let res = post_generate(&client, &base, PAYLOAD);
    assert_eq!(res.status().as_u16(), 200);
    let v: serde_json::Value = res.json().unwrap();
    assert_eq!(v["success"], true);
    let id = v["id"].as_str().unwrap().to_string();
    assert!(dir.path().join(format!("{}.html", id)).exists());

    let page = client.get(format!("{}/view/{}", base, id)).send().unwrap();
    assert_eq!(page.status().as_u16(), 200);
    assert!(page.headers().get("etag").is_some());
    let html = page.text().unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(">Arrivals</header>"));
    assert!(html.contains("display:block; background:black;"));

    handle.shutdown();
}

#[test]
fn errors_are_reported_with_distinct_statuses() {
    let (handle, base) = start(StorageBackend::Memory);
    let client = reqwest::blocking::Client::new();

    let res = post_generate(&client, &base, r#"{"layout":[["p.0"]]}"#);
    assert_eq!(res.status().as_u16(), 400);
    let v: serde_json::Value = res.json().unwrap();
    assert!(v["error"].as_str().unwrap().contains("resolution"));

    let res = post_generate(&client, &base, r#"{"layout":[["p.0","p.0"],["p.0"]],"resolution":{"width":10,"height":10}}"#);
    assert_eq!(res.status().as_u16(), 400);

    let res = client.get(format!("{}/view/does-not-exist", base)).send().unwrap();
    assert_eq!(res.status().as_u16(), 404);
    let v: serde_json::Value = res.json().unwrap();
    assert_eq!(v["error"], "Page not found");

    handle.shutdown();
}
