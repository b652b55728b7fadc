use std::time::{Duration, Instant};

use crate::common::{ADMIN_RECIPIENT, TestApp, valid_form};

#[tokio::test]
async fn sends_admin_and_confirmation_emails() {
    let app = TestApp::spawn().await;
    let form = valid_form();

    let res = app.submit(&form).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);

    let admin = sent.iter().find(|e| e.to == ADMIN_RECIPIENT).unwrap();
    assert_eq!(admin.subject, "New Application: SoilSense - Asha Raman");
    assert!(admin.html.contains("Moisture sensors"));
    assert!(admin.html.contains("₹5700.50"));

    let confirmation = sent.iter().find(|e| e.to == form.email).unwrap();
    assert_eq!(confirmation.subject, "Application Received - SoilSense");
    assert!(confirmation.html.contains("Asha Raman"));
}

#[tokio::test]
async fn admin_email_failure_still_succeeds() {
    let app = TestApp::spawn().await;
    app.mailer.fail_deliveries_to(ADMIN_RECIPIENT);

    let res = app.submit(&valid_form()).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    assert!(res.body["data"]["applicationId"].as_i64().unwrap() > 0);
    assert_eq!(app.application_count().await, 1);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Application Received - SoilSense");
}

#[tokio::test]
async fn user_text_is_escaped_in_emails() {
    let app = TestApp::spawn().await;
    let mut form = valid_form();
    form.startup_name = "<script>alert(1)</script>".into();

    let res = app.submit(&form).await;
    assert_eq!(res.status, 200, "{}", res.text);

    for email in app.mailer.sent() {
        assert!(!email.html.contains("<script>"), "{}", email.to);
        assert!(email.html.contains("&lt;script&gt;"));
    }
}

#[tokio::test]
async fn background_delivery_does_not_hold_the_response() {
    let app = TestApp::spawn_with(|config| config.mail.await_delivery = false).await;
    app.mailer.slow_down(Duration::from_secs(2));

    let started = Instant::now();
    let res = app.submit(&valid_form()).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(app.mailer.sent().is_empty());

    let sent = app.mailer.wait_for(2, Duration::from_secs(5)).await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|e| e.to == ADMIN_RECIPIENT));
}

#[tokio::test]
async fn background_delivery_failure_is_only_logged() {
    let app = TestApp::spawn_with(|config| config.mail.await_delivery = false).await;
    app.mailer.fail_deliveries_to(ADMIN_RECIPIENT);

    let res = app.submit(&valid_form()).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["success"], true);
    let sent = app.mailer.wait_for(1, Duration::from_secs(5)).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Application Received - SoilSense");
}
