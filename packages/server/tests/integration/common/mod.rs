use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use intake_common::storage::filesystem::FilesystemContentStore;
use intake_common::storage::{ContentStore, StorageError};
use intake_common::{ApplicationForm, ResourceItem};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::Value;
use tempfile::TempDir;

use intake_server::config::{
    AppConfig, CorsConfig, DatabaseConfig, MailConfig, ServerConfig, StorageConfig,
};
use intake_server::entity::{application, resource_request};
use intake_server::notify::{Email, MailError, Mailer, Notifier};
use intake_server::state::AppState;

pub mod routes {
    pub const APPLICATIONS: &str = "/api/v1/applications";
    pub const HEALTH: &str = "/health";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn application(id: i64) -> String {
        format!("/api/v1/applications/{id}")
    }
}

pub const ADMIN_RECIPIENT: &str = "staff@vnest.test";

/// Mailer that records every message and can be told to reject some.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    fail_to: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingMailer {
    pub fn fail_deliveries_to(&self, recipient: &str) {
        *self.fail_to.lock().unwrap() = Some(recipient.to_string());
    }

    /// Hold every send for `delay` before recording it.
    pub fn slow_down(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }

    /// Poll until `count` messages are recorded or `timeout` passes.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Email> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_to.lock().unwrap().as_deref() == Some(email.to.as_str()) {
            return Err(MailError::Rejected {
                status: 503,
                body: "relay unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Filesystem store whose writes can be switched off to simulate an outage.
pub struct ToggleStore {
    inner: FilesystemContentStore,
    offline: AtomicBool,
}

impl ToggleStore {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &FilesystemContentStore {
        &self.inner
    }
}

#[async_trait]
impl ContentStore for ToggleStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("simulated outage".into()));
        }
        self.inner.put(key, data, content_type).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.get(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }
}

/// A running test server.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub mailer: Arc<RecordingMailer>,
    pub store: Arc<ToggleStore>,
    /// Base of the deck URLs this server hands out.
    pub files_base_url: String,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn with a configuration tweak applied before the router is built.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("intake.db").display());
        let mut opts = ConnectOptions::new(&db_url);
        opts.max_connections(5).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts)
            .await
            .expect("Failed to connect to test database");
        intake_server::database::sync_schema(&db)
            .await
            .expect("Failed to create schema");
        intake_server::database::ensure_indexes(&db).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        let files_base_url = format!("http://{addr}{}", intake_server::FILES_ROUTE);

        let mut app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig::default(),
            },
            database: DatabaseConfig { url: db_url },
            storage: StorageConfig {
                local_root: dir.path().join("uploads"),
                public_base_url: files_base_url.clone(),
                ..Default::default()
            },
            mail: MailConfig {
                admin_recipient: ADMIN_RECIPIENT.to_string(),
                await_delivery: true,
                ..Default::default()
            },
        };

        configure(&mut app_config);

        let store = Arc::new(ToggleStore {
            inner: FilesystemContentStore::new(
                app_config.storage.local_root.clone(),
                &app_config.storage.public_base_url,
            )
            .await
            .expect("Failed to create content store"),
            offline: AtomicBool::new(false),
        });
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            db: db.clone(),
            notifier: Notifier::new(mailer.clone(), &app_config.mail),
            content_store: store.clone(),
            config: app_config,
        };

        let app = intake_server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            mailer,
            store,
            files_base_url,
            _dir: dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post_multipart(&self, form: Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(routes::APPLICATIONS))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Submit an application the way the form client does.
    pub async fn submit(&self, form: &ApplicationForm) -> TestResponse {
        self.post_multipart(multipart(form)).await
    }

    /// Submit an application with a slide deck attached.
    pub async fn submit_with_deck(
        &self,
        form: &ApplicationForm,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> TestResponse {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        self.post_multipart(multipart(form).part("pptFile", part))
            .await
    }

    /// Submit raw text parts, overriding or adding to a valid form.
    pub async fn submit_overriding(
        &self,
        form: &ApplicationForm,
        overrides: &[(&str, &str)],
    ) -> TestResponse {
        let mut parts = form.to_wire().expect("Failed to encode form");
        for (name, value) in overrides {
            match parts.iter_mut().find(|part| part.0 == *name) {
                Some(part) => part.1 = value.to_string(),
                None => panic!("unknown part {name}"),
            }
        }
        let mut multipart = Form::new();
        for (name, value) in parts {
            multipart = multipart.text(name, value);
        }
        self.post_multipart(multipart).await
    }

    pub async fn application_count(&self) -> u64 {
        application::Entity::find()
            .count(&self.db)
            .await
            .expect("Failed to count applications")
    }

    pub async fn resource_count(&self) -> u64 {
        resource_request::Entity::find()
            .count(&self.db)
            .await
            .expect("Failed to count resources")
    }
}

pub fn multipart(form: &ApplicationForm) -> Form {
    let mut multipart = Form::new();
    for (name, value) in form.to_wire().expect("Failed to encode form") {
        multipart = multipart.text(name, value);
    }
    multipart
}

/// A form that passes every validation rule.
pub fn valid_form() -> ApplicationForm {
    ApplicationForm {
        full_name: "Asha Raman".into(),
        register_number: "21BCE1234".into(),
        contact_number: "9876543210".into(),
        email: "asha.raman@example.edu".into(),
        school_department: "SCOPE".into(),
        year_of_study: "3rd Year".into(),
        startup_name: "SoilSense".into(),
        problem_statement: "Farmers over-irrigate because soil moisture is guessed.".into(),
        proposed_solution: "Cheap moisture probes that text the farmer.".into(),
        target_users: "Smallholder farmers in Tamil Nadu".into(),
        innovation: "Runs on a coin cell for a full season.".into(),
        ppt_link: "https://drive.google.com/file/d/1AbCdEf/view".into(),
        faculty_name: "Dr. Meena Iyer".into(),
        faculty_department: "SENSE".into(),
        faculty_email: "meena.iyer@example.edu".into(),
        faculty_contact: "9123456780".into(),
        faculty_employee_id: "EMP4521".into(),
        resources: vec![
            ResourceItem {
                resource_name: Some("Moisture sensors".into()),
                description: Some("Capacitive probes, pack of 20".into()),
                cost: Some(4500.0),
                link: Some("https://example.com/sensors".into()),
            },
            ResourceItem {
                resource_name: Some("Field visits".into()),
                description: None,
                cost: Some(1200.5),
                link: None,
            },
        ],
        consent: true,
    }
}
