use std::path::{Path, PathBuf};

use intake_common::application::{ATTACHMENT_EXTENSIONS, ATTACHMENT_FIELD, MAX_ATTACHMENT_BYTES};
use intake_common::response::{GENERIC_FAILURE_MESSAGE, SubmissionReceipt, SubmitResponse};
use intake_common::ApplicationForm;
use reqwest::blocking::multipart::{Form, Part};

/// A slide deck chosen by the applicant, checked and loaded before upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("Only .ppt, .pptx and .pdf files are accepted")]
    UnsupportedExtension,
    #[error("File size must be less than 20MB")]
    TooLarge { size: u64 },
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Attachment {
    /// Checks extension and size before reading the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttachmentError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(AttachmentError::UnsupportedExtension)?
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(AttachmentError::UnsupportedExtension)?;
        if !ATTACHMENT_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AttachmentError::UnsupportedExtension);
        }

        let io_err = |source| AttachmentError::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_ATTACHMENT_BYTES {
            return Err(AttachmentError::TooLarge { size });
        }
        let bytes = std::fs::read(path).map_err(io_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            bytes,
        })
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to encode form: {0}")]
    Encode(#[from] serde_json::Error),
    /// The server answered with `success: false` or an unreadable body.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Delivers a completed form to the submission endpoint.
pub trait Submitter {
    fn submit(
        &self,
        form: &ApplicationForm,
        attachment: Option<&Attachment>,
    ) -> Result<SubmissionReceipt, SubmitError>;
}

/// Posts the form as `multipart/form-data` to a running server.
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpSubmitter {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: format!("{}/api/v1/applications", server_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Builds the multipart payload: every text field, `resources` as JSON,
/// `consent` as "true"/"false", and the deck as `pptFile`.
pub fn build_payload(
    form: &ApplicationForm,
    attachment: Option<&Attachment>,
) -> Result<Form, SubmitError> {
    let mut payload = Form::new();
    for (name, value) in form.to_wire()? {
        payload = payload.text(name, value);
    }
    if let Some(file) = attachment {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type())?;
        payload = payload.part(ATTACHMENT_FIELD, part);
    }
    Ok(payload)
}

impl Submitter for HttpSubmitter {
    fn submit(
        &self,
        form: &ApplicationForm,
        attachment: Option<&Attachment>,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let payload = build_payload(form, attachment)?;
        let response = self.client.post(&self.endpoint).multipart(payload).send()?;
        let status = response.status().as_u16();

        match response.json::<SubmitResponse>() {
            Ok(SubmitResponse {
                success: true,
                data: Some(receipt),
                ..
            }) => Ok(receipt),
            Ok(body) => Err(SubmitError::Rejected {
                status,
                message: body.message,
            }),
            Err(_) => Err(SubmitError::Rejected {
                status,
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            }),
        }
    }
}
