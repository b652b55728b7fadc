use crate::common::{TestApp, routes};

#[tokio::test]
async fn health_check() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.text, "ok");
}

#[tokio::test]
async fn openapi_document_lists_application_routes() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::OPENAPI).await;

    assert_eq!(res.status, 200);
    let paths = res.body["paths"].as_object().unwrap();
    assert!(paths.keys().all(|p| p.starts_with("/api/v1/applications")));
    assert!(paths.contains_key("/api/v1/applications/{id}"));
    assert!(res.text.contains("\"submitApplication\""));
    assert!(res.text.contains("\"getApplication\""));
}
