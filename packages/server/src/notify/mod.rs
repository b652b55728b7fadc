//! Outbound notifications for accepted applications.
//!
//! Two messages go out per submission: the full record to the staff inbox
//! and a short acknowledgement to the applicant. Delivery never affects the
//! HTTP outcome; failures are logged and dropped.

pub mod mailer;
pub mod templates;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use intake_common::ApplicationForm;
use tracing::{error, info, warn};

use crate::config::MailConfig;
pub use mailer::{Email, HttpRelayMailer, LogMailer, MailError, Mailer};

/// Everything the templates need about an accepted application.
#[derive(Clone, Debug)]
pub struct ApplicationNotice {
    pub application_id: i32,
    pub form: ApplicationForm,
    pub ppt_file_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of one delivery round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub admin_sent: bool,
    pub confirmation_sent: bool,
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    from: String,
    admin_recipient: String,
    await_delivery: bool,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, config: &MailConfig) -> Self {
        Self {
            mailer,
            from: config.from.clone(),
            admin_recipient: config.admin_recipient.clone(),
            await_delivery: config.await_delivery,
        }
    }

    /// Picks the relay transport when mail is enabled, logging otherwise.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let mailer: Arc<dyn Mailer> = if config.enabled {
            Arc::new(HttpRelayMailer::new(config)?)
        } else {
            warn!("Mail delivery is disabled; notifications will only be logged");
            Arc::new(LogMailer)
        };
        Ok(Self::new(mailer, config))
    }

    pub fn admin_email(&self, notice: &ApplicationNotice) -> Email {
        Email {
            from: self.from.clone(),
            to: self.admin_recipient.clone(),
            subject: templates::admin_subject(notice),
            html: templates::admin_html(notice),
        }
    }

    pub fn confirmation_email(&self, notice: &ApplicationNotice) -> Email {
        Email {
            from: self.from.clone(),
            to: notice.form.email.clone(),
            subject: templates::confirmation_subject(notice),
            html: templates::confirmation_html(notice),
        }
    }

    /// Sends both messages concurrently. Errors are logged, not returned.
    pub async fn deliver(&self, notice: &ApplicationNotice) -> DeliveryReport {
        let admin = self.admin_email(notice);
        let confirmation = self.confirmation_email(notice);

        let (admin_result, confirmation_result) =
            tokio::join!(self.mailer.send(&admin), self.mailer.send(&confirmation));

        let application_id = notice.application_id;
        let report = DeliveryReport {
            admin_sent: log_outcome(application_id, "admin", admin_result),
            confirmation_sent: log_outcome(application_id, "confirmation", confirmation_result),
        };
        info!(
            application_id,
            admin_sent = report.admin_sent,
            confirmation_sent = report.confirmation_sent,
            "Notification round finished"
        );
        report
    }

    /// Runs [`Notifier::deliver`] on a background task.
    ///
    /// Waits for it only when `mail.await_delivery` is set.
    pub async fn dispatch(&self, notice: ApplicationNotice) {
        let notifier = self.clone();
        let handle = tokio::spawn(async move { notifier.deliver(&notice).await });

        if self.await_delivery
            && let Err(e) = handle.await
        {
            error!(error = %e, "Notification task failed");
        }
    }
}

fn log_outcome(application_id: i32, kind: &str, result: Result<(), MailError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!(application_id, kind, error = %e, "Email sending error");
            false
        }
    }
}
