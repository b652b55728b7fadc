use intake_common::storage::ContentStore;

use crate::common::{TestApp, routes, valid_form};

#[tokio::test]
async fn deck_is_stored_and_linked() {
    let app = TestApp::spawn().await;

    let res = app
        .submit_with_deck(&valid_form(), "SoilSense Pitch.pptx", b"PPTX-BYTES".to_vec())
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let id = res.body["data"]["applicationId"].as_i64().unwrap();
    let detail = app.get(&routes::application(id)).await;
    let url = detail.body["pptFileUrl"].as_str().unwrap();

    let prefix = format!("{}/applications/21BCE1234_", app.files_base_url);
    assert!(url.starts_with(&prefix), "{url}");
    assert!(url.ends_with(".pptx"), "{url}");

    let key = url.trim_start_matches(&format!("{}/", app.files_base_url));
    let stored = app.store.inner().get(key).await.unwrap();
    assert_eq!(stored, b"PPTX-BYTES");
}

#[tokio::test]
async fn recorded_deck_url_resolves() {
    let app = TestApp::spawn().await;

    let res = app
        .submit_with_deck(&valid_form(), "deck.pdf", b"%PDF-1.7 deck".to_vec())
        .await;
    assert_eq!(res.status, 200, "{}", res.text);

    let id = res.body["data"]["applicationId"].as_i64().unwrap();
    let detail = app.get(&routes::application(id)).await;
    let url = detail.body["pptFileUrl"].as_str().unwrap();

    let download = app.client.get(url).send().await.unwrap();
    assert_eq!(download.status().as_u16(), 200);
    assert_eq!(download.bytes().await.unwrap().as_ref(), b"%PDF-1.7 deck");

    let missing = app.get("/files/applications/nothing_here.pdf").await;
    assert_eq!(missing.status, 404);
}

#[tokio::test]
async fn empty_file_part_counts_as_no_attachment() {
    let app = TestApp::spawn().await;

    let res = app.submit_with_deck(&valid_form(), "", Vec::new()).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let id = res.body["data"]["applicationId"].as_i64().unwrap();
    let detail = app.get(&routes::application(id)).await;
    assert!(detail.body["pptFileUrl"].is_null());
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .submit_with_deck(&valid_form(), "pitch.docx", b"DOCX".to_vec())
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "Only .ppt, .pptx and .pdf files are accepted");
    assert_eq!(app.application_count().await, 0);
}

#[tokio::test]
async fn oversized_deck_is_rejected() {
    let app = TestApp::spawn_with(|config| config.storage.max_upload_size = 64 * 1024).await;
    let bytes = vec![0u8; 64 * 1024 + 1];

    let res = app.submit_with_deck(&valid_form(), "big.pdf", bytes).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "File exceeds maximum size of 64 KB");
    assert_eq!(res.body["success"], false);
    assert_eq!(app.application_count().await, 0);
}

#[tokio::test]
async fn storage_outage_persists_nothing() {
    let app = TestApp::spawn().await;
    app.store.set_offline(true);

    let res = app
        .submit_with_deck(&valid_form(), "deck.pdf", b"%PDF-1.7".to_vec())
        .await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body["message"], "Failed to upload PPT file");
    assert_eq!(app.application_count().await, 0);
    assert_eq!(app.resource_count().await, 0);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn resubmitting_after_outage_stores_one_application() {
    let app = TestApp::spawn().await;
    let form = valid_form();

    app.store.set_offline(true);
    let failed = app
        .submit_with_deck(&form, "deck.pdf", b"%PDF-1.7".to_vec())
        .await;
    assert_eq!(failed.status, 500);

    app.store.set_offline(false);
    let retried = app
        .submit_with_deck(&form, "deck.pdf", b"%PDF-1.7".to_vec())
        .await;

    assert_eq!(retried.status, 200, "{}", retried.text);
    assert_eq!(app.application_count().await, 1);
    assert_eq!(app.resource_count().await, 2);
}
