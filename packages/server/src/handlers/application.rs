use std::collections::HashMap;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use chrono::{DateTime, Utc};
use intake_common::application::{ATTACHMENT_FIELD, Field};
use intake_common::response::{SubmissionReceipt, SubmitResponse};
use intake_common::storage::ContentStore;
use intake_common::{ApplicationForm, ResourceItem, validate_form};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{info, instrument, warn};

use crate::entity::{application, resource_request};
use crate::error::AppError;
use crate::models::application::{ApplicationDetailResponse, UploadedFile};
use crate::notify::ApplicationNotice;
use crate::state::AppState;
use crate::utils::filename::{attachment_extension, attachment_key};

/// Headroom for the text parts on top of the deck size limit.
const TEXT_PARTS_ALLOWANCE: usize = 1024 * 1024;

pub fn application_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(body_limit_bytes(max_upload_size))
}

fn body_limit_bytes(max_upload_size: u64) -> usize {
    usize::try_from(max_upload_size)
        .unwrap_or(usize::MAX)
        .saturating_add(TEXT_PARTS_ALLOWANCE)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Applications",
    operation_id = "submitApplication",
    summary = "Submit a pre-incubation application",
    description = "Accepts the full application as `multipart/form-data`. Every form field is a \
        text part; `resources` is a JSON-encoded array of resource items and `consent` must be \
        `true`. An optional `pptFile` part carries the slide deck (.ppt, .pptx or .pdf, at most \
        20 MB). Notification emails are sent after the application is stored; their failure \
        does not affect the response.",
    request_body(content_type = "multipart/form-data", description = "Application fields with optional slide deck"),
    responses(
        (status = 200, description = "Application stored", body = SubmitResponse),
        (status = 400, description = "Malformed resources, failed validation or rejected attachment", body = SubmitResponse),
        (status = 500, description = "Upload or database failure", body = SubmitResponse),
    ),
)]
#[instrument(skip(state, multipart), fields(application_id))]
pub async fn submit_application(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut multipart =
        multipart.map_err(|e| AppError::Validation(format!("Expected multipart form data: {e}")))?;
    let max_upload_size = state.config.storage.max_upload_size;

    let mut parts: HashMap<String, String> = HashMap::new();
    let mut pending_file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == ATTACHMENT_FIELD {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = read_limited(field, max_upload_size).await?;
            // Browsers send an empty part when no file was chosen.
            if !(filename.is_empty() && bytes.is_empty()) {
                pending_file = Some((filename, bytes));
            }
        } else if Field::from_name(&name).is_some() {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))?;
            parts.insert(name, text);
        }
        // Unknown parts are ignored.
    }

    let form = ApplicationForm::from_wire(&parts)
        .map_err(|e| AppError::InvalidResources(e.to_string()))?;

    validate_form(&form).map_err(|errors| AppError::Validation(errors.to_string()))?;

    let attachment = match pending_file {
        Some((filename, bytes)) => {
            let extension =
                attachment_extension(&filename).map_err(|e| AppError::Validation(e.message().into()))?;
            Some(UploadedFile {
                filename,
                extension,
                bytes,
            })
        }
        None => None,
    };

    let submitted_at = Utc::now();

    let ppt_file_url = match &attachment {
        Some(file) => Some(
            store_attachment(
                &*state.content_store,
                &form.register_number,
                file,
                submitted_at,
            )
            .await?,
        ),
        None => None,
    };

    let saved = insert_application(&state, &form, ppt_file_url.clone(), submitted_at)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?;
    tracing::Span::current().record("application_id", saved.id);

    insert_resources(&state, saved.id, &form.resources).await;

    info!(
        application_id = saved.id,
        resources = form.resources.len(),
        has_attachment = ppt_file_url.is_some(),
        "Application stored"
    );

    state
        .notifier
        .dispatch(ApplicationNotice {
            application_id: saved.id,
            form,
            ppt_file_url,
            submitted_at: saved.submitted_at,
        })
        .await;

    Ok(Json(SubmitResponse::submitted(SubmissionReceipt {
        application_id: saved.id,
        submitted_at: saved.submitted_at,
    })))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Applications",
    operation_id = "getApplication",
    summary = "Get a stored application",
    description = "Returns the stored application with its resource rows and the total estimated cost.",
    params(("id" = i32, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application details", body = ApplicationDetailResponse),
        (status = 404, description = "Application not found", body = SubmitResponse),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    let model = application::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    let resources = resource_request::Entity::find()
        .filter(resource_request::Column::ApplicationId.eq(id))
        .order_by_asc(resource_request::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(ApplicationDetailResponse::new(model, resources)))
}

/// Buffers a multipart field, aborting as soon as it exceeds `max_size`.
async fn read_limited(
    mut field: axum::extract::multipart::Field<'_>,
    max_size: u64,
) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (buf.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {}",
                display_size(max_size)
            )));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

fn display_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else {
        format!("{} KB", bytes.div_ceil(1024))
    }
}

async fn store_attachment(
    store: &dyn ContentStore,
    register_number: &str,
    file: &UploadedFile,
    submitted_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let key = attachment_key(
        register_number,
        submitted_at.timestamp_millis(),
        &file.extension,
    );

    store.put(&key, &file.bytes, &file.content_type()).await?;
    info!(
        key = %key,
        filename = %file.filename,
        size = file.bytes.len(),
        "Stored slide deck"
    );

    Ok(store.public_url(&key))
}

async fn insert_application(
    state: &AppState,
    form: &ApplicationForm,
    ppt_file_url: Option<String>,
    submitted_at: DateTime<Utc>,
) -> Result<application::Model, sea_orm::DbErr> {
    let new_application = application::ActiveModel {
        full_name: Set(form.full_name.clone()),
        register_number: Set(form.register_number.clone()),
        contact_number: Set(form.contact_number.clone()),
        email: Set(form.email.clone()),
        school_department: Set(form.school_department.clone()),
        year_of_study: Set(form.year_of_study.clone()),
        startup_name: Set(form.startup_name.clone()),
        problem_statement: Set(form.problem_statement.clone()),
        proposed_solution: Set(form.proposed_solution.clone()),
        target_users: Set(form.target_users.clone()),
        innovation: Set(form.innovation.clone()),
        ppt_link: Set(form.ppt_link.clone()),
        ppt_file_url: Set(ppt_file_url),
        faculty_name: Set(form.faculty_name.clone()),
        faculty_department: Set(form.faculty_department.clone()),
        faculty_email: Set(form.faculty_email.clone()),
        faculty_contact: Set(form.faculty_contact.clone()),
        faculty_employee_id: Set(form.faculty_employee_id.clone()),
        consent: Set(form.consent),
        submitted_at: Set(submitted_at),
        ..Default::default()
    };

    new_application.insert(&state.db).await
}

/// Stores the resource rows in one batch. Failure is logged only: the
/// application row is already committed.
async fn insert_resources(state: &AppState, application_id: i32, resources: &[ResourceItem]) {
    if resources.is_empty() {
        return;
    }

    let rows = resources.iter().map(|item| {
        let item = item.normalized();
        let cost = item.cost_or_zero();
        resource_request::ActiveModel {
            application_id: Set(application_id),
            resource_name: Set(item.resource_name),
            description: Set(item.description),
            cost: Set(cost),
            link: Set(item.link),
            ..Default::default()
        }
    });

    if let Err(e) = resource_request::Entity::insert_many(rows)
        .exec(&state.db)
        .await
    {
        warn!(application_id, error = %e, "Resources insert error");
    }
}
