use chrono::DateTime;
use sea_orm::ConnectionTrait;

use crate::common::{ADMIN_RECIPIENT, TestApp, routes, valid_form};

mod submit_application {
    use super::*;

    #[tokio::test]
    async fn valid_payload_is_stored() {
        let app = TestApp::spawn().await;

        let res = app.submit(&valid_form()).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.body["message"], "Application submitted successfully");
        let id = res.body["data"]["applicationId"].as_i64().unwrap();
        assert!(id > 0);
        let submitted_at = res.body["data"]["submittedAt"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(submitted_at).is_ok());

        assert_eq!(app.application_count().await, 1);
        assert_eq!(app.resource_count().await, 2);
    }

    #[tokio::test]
    async fn stored_record_matches_submission() {
        let app = TestApp::spawn().await;
        let form = valid_form();

        let res = app.submit(&form).await;
        let id = res.body["data"]["applicationId"].as_i64().unwrap();

        let detail = app.get(&routes::application(id)).await;
        assert_eq!(detail.status, 200, "{}", detail.text);
        assert_eq!(detail.body["fullName"], form.full_name);
        assert_eq!(detail.body["registerNumber"], form.register_number);
        assert_eq!(detail.body["pptLink"], form.ppt_link);
        assert_eq!(detail.body["facultyEmployeeId"], form.faculty_employee_id);
        assert_eq!(detail.body["consent"], true);
        assert!(detail.body["pptFileUrl"].is_null());

        let resources = detail.body["resources"].as_array().unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0]["resourceName"], "Moisture sensors");
        assert_eq!(resources[0]["cost"], 4500.0);
        assert!(resources[1]["link"].is_null());
        assert_eq!(detail.body["totalCost"], 5700.5);
    }

    #[tokio::test]
    async fn zero_resources_is_accepted() {
        let app = TestApp::spawn().await;
        let mut form = valid_form();
        form.resources.clear();

        let res = app.submit(&form).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.application_count().await, 1);
        assert_eq!(app.resource_count().await, 0);

        let id = res.body["data"]["applicationId"].as_i64().unwrap();
        let detail = app.get(&routes::application(id)).await;
        let total = detail.body["totalCost"].as_f64().unwrap();
        assert_eq!(total, 0.0);
        assert!(total.is_sign_positive(), "{}", detail.text);

        let sent = app.mailer.sent();
        let admin = sent.iter().find(|e| e.to == ADMIN_RECIPIENT).unwrap();
        assert!(admin.html.contains("No resources required"));
        assert!(admin.html.contains("Total Estimated Cost:</span> ₹0</p>"));
    }

    #[tokio::test]
    async fn resource_insert_failure_keeps_application() {
        let app = TestApp::spawn().await;
        app.db
            .execute_unprepared("DROP TABLE resource_request")
            .await
            .unwrap();

        let res = app.submit(&valid_form()).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert!(res.body["data"]["applicationId"].as_i64().unwrap() > 0);
        assert_eq!(app.application_count().await, 1);
        assert_eq!(app.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn blank_costs_are_stored_as_zero() {
        let app = TestApp::spawn().await;
        let resources = r#"[{"resourceName":"Mentoring","description":"","cost":"","link":""}]"#;

        let res = app
            .submit_overriding(&valid_form(), &[("resources", resources)])
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let id = res.body["data"]["applicationId"].as_i64().unwrap();
        let detail = app.get(&routes::application(id)).await;
        let row = &detail.body["resources"][0];
        assert_eq!(row["cost"], 0.0);
        assert!(row["description"].is_null());
        assert!(row["link"].is_null());
    }

    #[tokio::test]
    async fn each_submission_gets_a_new_id() {
        let app = TestApp::spawn().await;

        let first = app.submit(&valid_form()).await;
        let second = app.submit(&valid_form()).await;

        assert_ne!(
            first.body["data"]["applicationId"],
            second.body["data"]["applicationId"]
        );
        assert_eq!(app.application_count().await, 2);
    }
}

mod rejected_submissions {
    use super::*;

    #[tokio::test]
    async fn non_multipart_body_gets_envelope() {
        let app = TestApp::spawn().await;

        let res = app
            .client
            .post(app.url(routes::APPLICATIONS))
            .json(&serde_json::json!({ "fullName": "Asha Raman" }))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Expected multipart form data"),
            "{body}"
        );
        assert_eq!(app.application_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_resources_are_rejected_without_writes() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(&valid_form(), &[("resources", "{not json")])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["message"], "Invalid resources data format");
        assert_eq!(app.application_count().await, 0);
        assert_eq!(app.resource_count().await, 0);
    }

    #[tokio::test]
    async fn resources_must_be_a_list() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(&valid_form(), &[("resources", r#"{"resourceName":"x"}"#)])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Invalid resources data format");
    }

    #[tokio::test]
    async fn missing_consent_never_persists() {
        let app = TestApp::spawn().await;
        let mut form = valid_form();
        form.consent = false;

        let res = app.submit(&form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Consent is required");
        assert_eq!(app.application_count().await, 0);
        assert!(app.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_required_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(&valid_form(), &[("fullName", "   ")])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Full name is required");
        assert_eq!(app.application_count().await, 0);
    }

    #[tokio::test]
    async fn long_abstract_is_rejected() {
        let app = TestApp::spawn().await;
        let long = "a".repeat(301);

        let res = app
            .submit_overriding(&valid_form(), &[("innovation", long.as_str())])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["message"],
            "Innovation/uniqueness must not exceed 300 characters"
        );
    }

    #[tokio::test]
    async fn abstract_at_limit_is_accepted() {
        let app = TestApp::spawn().await;
        let exact = "é".repeat(300);

        let res = app
            .submit_overriding(&valid_form(), &[("problemStatement", exact.as_str())])
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn non_drive_link_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(
                &valid_form(),
                &[("pptLink", "https://www.dropbox.com/s/abc/deck.pptx")],
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Please provide a valid Google Drive link");
    }

    #[tokio::test]
    async fn all_errors_are_reported_together() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(
                &valid_form(),
                &[("email", "not-an-email"), ("contactNumber", "12345")],
            )
            .await;

        assert_eq!(res.status, 400);
        let message = res.body["message"].as_str().unwrap();
        assert!(message.contains("Invalid email address"), "{message}");
        assert!(
            message.contains("Contact number must be at least 10 digits"),
            "{message}"
        );
    }

    #[tokio::test]
    async fn negative_cost_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .submit_overriding(&valid_form(), &[("resources", r#"[{"cost":-5}]"#)])
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Cost must be a positive number");
        assert_eq!(app.application_count().await, 0);
    }
}

mod get_application {
    use super::*;

    #[tokio::test]
    async fn unknown_id_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::application(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["message"], "Application not found");
    }
}
