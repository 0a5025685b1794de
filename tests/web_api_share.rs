//! Web API Share Tests
//!
//! Integration tests for share link minting and share pages.

mod common;

use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{create_test_server, file_form, file_id, link_id, upload};
use fileshare::file::{FileRepository, NewFile};

// ============================================================================
// Link Minting
// ============================================================================

#[tokio::test]
async fn test_share_link_for_file_is_idempotent() {
    let ctx = create_test_server().await;
    let data = upload(&ctx.server, file_form("a.txt", b"a")).await;
    let id = file_id(&data);

    let first: Value = ctx.server.get(&format!("/share/{id}")).await.json();
    let second: Value = ctx.server.get(&format!("/share/{id}")).await.json();

    assert_eq!(first["data"]["link_id"], second["data"]["link_id"]);
    assert_eq!(first["data"]["link_id"], data["link_id"]);
    assert_eq!(first["data"]["file_id"], id.as_str());
    assert_eq!(
        first["data"]["share_url"],
        format!("http://files.test/share/{}", link_id(&data))
    );
}

#[tokio::test]
async fn test_share_link_minted_lazily() {
    let ctx = create_test_server().await;

    // A record without a link, as left by an older deployment
    let record = FileRepository::new(ctx.db.pool())
        .insert(&NewFile::new("legacy.txt", "legacy.txt", 6, "text/plain"))
        .await
        .unwrap();
    ctx.storage.save(b"legacy", "legacy.txt").await.unwrap();

    let first: Value = ctx
        .server
        .get(&format!("/share/{}", record.id))
        .await
        .json();
    let minted = first["data"]["link_id"].as_str().unwrap().to_string();
    assert_eq!(minted.len(), 32);

    let second: Value = ctx
        .server
        .get(&format!("/share/{}", record.id))
        .await
        .json();
    assert_eq!(second["data"]["link_id"], minted.as_str());

    let response = ctx.server.get(&format!("/download/{minted}")).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"legacy");
}

#[tokio::test]
async fn test_share_unknown_file() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/share/no-such-file").await;
    assert_eq!(response.status_code(), 404);

    let response = ctx
        .server
        .get("/share/ffffffffffffffffffffffffffffffff")
        .await;
    assert_eq!(response.status_code(), 404);
}

// ============================================================================
// Share Page
// ============================================================================

#[tokio::test]
async fn test_share_page_ready() {
    let ctx = create_test_server().await;
    let form = file_form("report.pdf", b"pdf").add_text("download_limit", "2");
    let data = upload(&ctx.server, form).await;

    let response = ctx
        .server
        .get(&format!("/share/{}", link_id(&data)))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let page = &body["data"];

    assert_eq!(page["original_name"], "report.pdf");
    assert_eq!(page["allowed"], true);
    assert_eq!(page["downloads_remaining"], 2);
    assert_eq!(page["password_required"], false);
    assert_eq!(page["message"], "Ready to download");
    assert_eq!(
        page["download_url"],
        format!("http://files.test/download/{}", link_id(&data))
    );
    assert!(page.get("reason").is_none());

    // Viewing the page does not count as a download
    let record = FileRepository::new(ctx.db.pool())
        .get_by_id(&file_id(&data))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.downloads, 0);
}

#[tokio::test]
async fn test_share_page_password_prompt() {
    let ctx = create_test_server().await;
    let form = file_form("secret.txt", b"s").add_text("password", "abc123");
    let data = upload(&ctx.server, form).await;
    let url = format!("/share/{}", link_id(&data));

    let body: Value = ctx.server.get(&url).await.json();
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["reason"], "password_required");
    assert_eq!(body["data"]["password_required"], true);

    let body: Value = ctx
        .server
        .post(&url)
        .json(&json!({ "password": "wrong" }))
        .await
        .json();
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["reason"], "password_incorrect");
    assert_eq!(body["data"]["password_required"], true);

    let body: Value = ctx
        .server
        .post(&url)
        .json(&json!({ "password": "abc123" }))
        .await
        .json();
    assert_eq!(body["data"]["allowed"], true);
}

#[tokio::test]
async fn test_share_page_limit_reached() {
    let ctx = create_test_server().await;
    let form = file_form("once.txt", b"1").add_text("download_limit", "1");
    let data = upload(&ctx.server, form).await;

    ctx.server
        .get(&format!("/download/{}", link_id(&data)))
        .await
        .assert_status_ok();

    let body: Value = ctx
        .server
        .get(&format!("/share/{}", link_id(&data)))
        .await
        .json();
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["reason"], "download_limit_exceeded");
    assert_eq!(body["data"]["message"], "Download limit reached");
    assert_eq!(body["data"]["downloads_remaining"], 0);
}

#[tokio::test]
async fn test_share_page_expired() {
    let ctx = create_test_server().await;

    let record = FileRepository::new(ctx.db.pool())
        .insert(
            &NewFile::new("old.txt", "old.txt", 1, "text/plain")
                .with_expire_date(Utc::now() - Duration::minutes(5)),
        )
        .await
        .unwrap();
    let minted: Value = ctx
        .server
        .get(&format!("/share/{}", record.id))
        .await
        .json();
    let link = minted["data"]["link_id"].as_str().unwrap();

    let body: Value = ctx.server.get(&format!("/share/{link}")).await.json();
    assert_eq!(body["data"]["allowed"], false);
    assert_eq!(body["data"]["reason"], "expired_link");
    assert_eq!(body["data"]["password_required"], false);
}
