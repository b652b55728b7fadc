use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::{application, resource_request};

/// A slide deck received in the `pptFile` part, fully buffered.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    /// Lower-cased, already checked against the accepted formats.
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn content_type(&self) -> String {
        mime_guess::from_ext(&self.extension)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Response DTO for a stored resource line item.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequestResponse {
    pub id: i32,
    #[schema(example = "Raspberry Pi kit")]
    pub resource_name: Option<String>,
    pub description: Option<String>,
    #[schema(example = 4500.0)]
    pub cost: f64,
    pub link: Option<String>,
}

impl From<resource_request::Model> for ResourceRequestResponse {
    fn from(model: resource_request::Model) -> Self {
        Self {
            id: model.id,
            resource_name: model.resource_name,
            description: model.description,
            cost: model.cost,
            link: model.link,
        }
    }
}

/// Response DTO for a stored application with its resource rows.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetailResponse {
    #[schema(example = 42)]
    pub id: i32,
    pub full_name: String,
    pub register_number: String,
    pub contact_number: String,
    pub email: String,
    pub school_department: String,
    pub year_of_study: String,
    pub startup_name: String,
    pub problem_statement: String,
    pub proposed_solution: String,
    pub target_users: String,
    pub innovation: String,
    pub ppt_link: String,
    /// Public URL of the uploaded deck, if one was attached.
    pub ppt_file_url: Option<String>,
    pub faculty_name: String,
    pub faculty_department: String,
    pub faculty_email: String,
    pub faculty_contact: String,
    pub faculty_employee_id: String,
    pub consent: bool,
    pub submitted_at: DateTime<Utc>,
    pub resources: Vec<ResourceRequestResponse>,
    /// Sum of all resource costs.
    pub total_cost: f64,
}

impl ApplicationDetailResponse {
    pub fn new(model: application::Model, resources: Vec<resource_request::Model>) -> Self {
        let resources: Vec<ResourceRequestResponse> =
            resources.into_iter().map(Into::into).collect();
        let total_cost = resources.iter().fold(0.0, |acc, r| acc + r.cost);

        Self {
            id: model.id,
            full_name: model.full_name,
            register_number: model.register_number,
            contact_number: model.contact_number,
            email: model.email,
            school_department: model.school_department,
            year_of_study: model.year_of_study,
            startup_name: model.startup_name,
            problem_statement: model.problem_statement,
            proposed_solution: model.proposed_solution,
            target_users: model.target_users,
            innovation: model.innovation,
            ppt_link: model.ppt_link,
            ppt_file_url: model.ppt_file_url,
            faculty_name: model.faculty_name,
            faculty_department: model.faculty_department,
            faculty_email: model.faculty_email,
            faculty_contact: model.faculty_contact,
            faculty_employee_id: model.faculty_employee_id,
            consent: model.consent,
            submitted_at: model.submitted_at,
            resources,
            total_cost,
        }
    }
}
