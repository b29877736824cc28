// Integration tests for the Meerkat CLI
//
// These tests drive the library end to end against a mock receipt service and
// a mock auth provider: login, token refresh, the request pipeline and the
// command handlers that sit on top of it.

use chrono::Utc;
use mockito::{Matcher, Server, ServerGuard};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

use meerkat_cli::{
    auth::{self, LoginParams, AUTH_CONFIG_PATH},
    commands::{self, upload, whoami, CommandContext},
    config::{Command, ConfigCommand, GlobalOptions, UploadArgs},
    error::{CliError, EXIT_AUTH_REQUIRED},
    models::{ConfigRecord, CredentialRecord},
    store::Store,
};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

fn json_opts() -> GlobalOptions {
    GlobalOptions {
        json: true,
        ..GlobalOptions::default()
    }
}

/// Mock discovery pointing the auth provider back at the same server
async fn mock_discovery(server: &mut ServerGuard) -> mockito::Mock {
    let body = json!({
        "supabase_url": server.url(),
        "supabase_anon_key": "test-anon-key"
    });
    server
        .mock("GET", AUTH_CONFIG_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

fn token_body(access: &str, refresh: &str, expires_in: i64) -> String {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
        "token_type": "bearer",
        "user": { "email": "test@example.com" }
    })
    .to_string()
}

/// Store with config and credentials expiring in `expires_in` seconds
async fn logged_in_store(server: &ServerGuard, expires_in: i64) -> (TempDir, Store) {
    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    store
        .save_config(&ConfigRecord {
            server_url: server.url(),
            auth_provider_url: server.url(),
            auth_provider_key: "test-anon-key".to_string(),
            currency: None,
        })
        .await
        .unwrap();
    store
        .save_credentials(&CredentialRecord {
            email: "test@example.com".to_string(),
            access_token: "old-access-token".to_string(),
            refresh_token: "old-refresh-token".to_string(),
            expires_at: Utc::now().timestamp() + expires_in,
        })
        .await
        .unwrap();
    (dir, store)
}

// ==================================================================================================
// Login
// ==================================================================================================

#[tokio::test]
async fn test_login_then_whoami() {
    let mut server = Server::new_async().await;
    let _discovery = mock_discovery(&mut server).await;
    let grant = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .match_header("apikey", "test-anon-key")
        .match_body(Matcher::Json(json!({
            "email": "test@example.com",
            "password": "secret"
        })))
        .with_status(200)
        .with_body(token_body("access-1", "refresh-1", 3600))
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let store = Store::new(dir.path());
    let outcome = auth::login(
        &Client::new(),
        &store,
        &LoginParams {
            server_url: server.url(),
            email: "test@example.com".to_string(),
            password: "secret".to_string(),
            verbose: false,
        },
        None,
    )
    .await
    .unwrap();
    grant.assert_async().await;

    let info = whoami::whoami(&store).await.unwrap();
    assert_eq!(info.email, outcome.email);
    assert_eq!(info.server, server.url());
    assert_eq!(info.expires_at, outcome.expires_at);

    let credentials = store.load_credentials().await.unwrap();
    assert_eq!(credentials.access_token, "access-1");
    assert_eq!(credentials.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_discovery_failure_writes_nothing() {
    let mut server = Server::new_async().await;
    let _discovery = server
        .mock("GET", AUTH_CONFIG_PATH)
        .with_status(500)
        .create_async()
        .await;
    let grant = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let store = Store::new(dir.path().join("meerkat"));
    let err = auth::login(
        &Client::new(),
        &store,
        &LoginParams {
            server_url: server.url(),
            email: "test@example.com".to_string(),
            password: "secret".to_string(),
            verbose: false,
        },
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CliError::Discovery(_)));
    grant.assert_async().await;
    assert!(!store.config_path().exists());
    assert!(!store.credentials_path().exists());
}

// ==================================================================================================
// Token refresh through the request pipeline
// ==================================================================================================

#[tokio::test]
async fn test_expiring_token_is_refreshed_before_request() {
    let mut server = Server::new_async().await;
    let refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::UrlEncoded(
            "grant_type".into(),
            "refresh_token".into(),
        ))
        .match_body(Matcher::Json(json!({ "refresh_token": "old-refresh-token" })))
        .with_status(200)
        .with_body(token_body("new-access-token", "new-refresh-token", 3600))
        .expect(1)
        .create_async()
        .await;
    let api_call = server
        .mock("GET", "/api/v1/receipts/recent")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer new-access-token")
        .with_status(200)
        .with_body(r#"{"total":0,"offset":0,"limit":50,"items":[]}"#)
        .create_async()
        .await;

    let (_dir, store) = logged_in_store(&server, 60).await;
    let before = store.load_credentials().await.unwrap().expires_at;

    let ctx = CommandContext::new(store.clone(), Client::new(), json_opts());
    let data: Value = ctx
        .api
        .get("/api/v1/receipts/recent?limit=50&offset=0", false)
        .await
        .unwrap();

    refresh.assert_async().await;
    api_call.assert_async().await;
    assert_eq!(data["total"], 0);

    let after = store.load_credentials().await.unwrap();
    assert_eq!(after.access_token, "new-access-token");
    assert_eq!(after.refresh_token, "new-refresh-token");
    assert!(after.expires_at > before);
}

#[tokio::test]
async fn test_rejected_refresh_requires_login() {
    let mut server = Server::new_async().await;
    let _refresh = server
        .mock("POST", "/auth/v1/token")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;
    let api_call = server
        .mock("GET", "/api/v1/receipts/recent")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (_dir, store) = logged_in_store(&server, 10).await;
    let before = store.load_credentials().await.unwrap();

    let ctx = CommandContext::new(store.clone(), Client::new(), json_opts());
    let err = ctx
        .api
        .get::<Value>("/api/v1/receipts/recent", false)
        .await
        .unwrap_err();

    assert!(err.is_auth_required());
    assert_eq!(err.exit_code(), EXIT_AUTH_REQUIRED);
    api_call.assert_async().await;
    assert_eq!(store.load_credentials().await.unwrap(), before);
}

// ==================================================================================================
// Commands
// ==================================================================================================

#[tokio::test]
async fn test_upload_and_wait() {
    let mut server = Server::new_async().await;
    let upload_call = server
        .mock("POST", "/api/v1/inbox/upload")
        .match_header("authorization", "Bearer old-access-token")
        .match_body(Matcher::Regex(r#"filename="receipt.png""#.to_string()))
        .with_status(200)
        .with_body(
            json!({"items": [{"id": "item-1", "file_name": "receipt.png", "status": "pending"}]})
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let poll = server
        .mock("GET", "/api/v1/inbox/item-1")
        .with_status(200)
        .with_body(
            json!({
                "id": "item-1",
                "file_name": "receipt.png",
                "status": "done",
                "created_at": "2025-01-15T10:30:00Z",
                "merchant_name": "Lidl",
                "total_amount": 12.3,
                "currency": "EUR"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (dir, store) = logged_in_store(&server, 3600).await;
    let file = dir.path().join("receipt.png");
    std::fs::write(&file, b"\x89PNG fake").unwrap();

    let ctx = CommandContext::new(store, Client::new(), json_opts());
    upload::run_with(
        &ctx,
        UploadArgs {
            files: vec![file.to_string_lossy().into_owned()],
            wait: true,
        },
        upload::PollSettings {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(2),
        },
    )
    .await
    .unwrap();

    upload_call.assert_async().await;
    poll.assert_async().await;
}

#[tokio::test]
async fn test_logout_then_whoami_requires_login() {
    let server = Server::new_async().await;
    let (_dir, store) = logged_in_store(&server, 3600).await;
    let ctx = CommandContext::new(store.clone(), Client::new(), json_opts());

    commands::run(Command::Logout, &ctx).await.unwrap();

    let err = commands::run(Command::Whoami, &ctx).await.unwrap_err();
    assert_eq!(err.exit_code(), EXIT_AUTH_REQUIRED);
    // Config survives logout
    assert!(store.load_config().await.is_some());
}

#[tokio::test]
async fn test_config_set_through_dispatch() {
    let server = Server::new_async().await;
    let (_dir, store) = logged_in_store(&server, 3600).await;
    let ctx = CommandContext::new(store.clone(), Client::new(), json_opts());

    let set = |key: &str, value: &str| {
        Command::Config(meerkat_cli::config::ConfigArgs {
            command: Some(ConfigCommand::Set {
                key: key.to_string(),
                value: value.to_string(),
            }),
        })
    };

    commands::run(set("currency", "GBP"), &ctx).await.unwrap();
    assert_eq!(
        store.load_config().await.unwrap().currency.as_deref(),
        Some("GBP")
    );

    let err = commands::run(set("email", "x"), &ctx).await.unwrap_err();
    assert!(matches!(err, CliError::Validation(_)));
}
