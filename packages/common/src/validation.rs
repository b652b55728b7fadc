//! Field rules shared by the form wizard and the submission handler.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::application::{
    ApplicationForm, CLOUD_DRIVE_HOSTS, Field, MAX_ABSTRACT_CHARS, MAX_LINK_CHARS,
    MIN_CONTACT_CHARS, ResourceItem,
};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// A single rule violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    /// Row index for errors inside the resource list.
    pub resource_index: Option<usize>,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            resource_index: None,
            message: message.into(),
        }
    }

    fn resource(index: usize, message: impl Into<String>) -> Self {
        Self {
            field: Field::Resources,
            resource_index: Some(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_index {
            Some(i) => write!(f, "resources[{i}]: {}", self.message),
            None => write!(f, "{}: {}", self.field.name(), self.message),
        }
    }
}

/// All violations found in one validation pass, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Violations for one field.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &FieldError> {
        self.0.iter().filter(move |e| e.field == field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.for_field(field).next().is_some()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.message.clone()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates the given fields only.
pub fn validate_fields(form: &ApplicationForm, fields: &[Field]) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    for &field in fields {
        check_field(form, field, &mut errors);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Validates the whole form.
pub fn validate_form(form: &ApplicationForm) -> Result<(), ValidationErrors> {
    validate_fields(form, &Field::ALL)
}

fn check_field(form: &ApplicationForm, field: Field, errors: &mut Vec<FieldError>) {
    match field {
        Field::FullName
        | Field::RegisterNumber
        | Field::SchoolDepartment
        | Field::YearOfStudy
        | Field::StartupName
        | Field::FacultyName
        | Field::FacultyDepartment
        | Field::FacultyEmployeeId => {
            if is_blank(form.text(field)) {
                errors.push(FieldError::new(field, format!("{} is required", field.label())));
            }
        }
        Field::ContactNumber | Field::FacultyContact => {
            let value = form.text(field).unwrap_or_default().trim();
            if value.chars().count() < MIN_CONTACT_CHARS {
                errors.push(FieldError::new(
                    field,
                    "Contact number must be at least 10 digits",
                ));
            }
        }
        Field::Email | Field::FacultyEmail => {
            if !is_valid_email(form.text(field).unwrap_or_default()) {
                errors.push(FieldError::new(field, "Invalid email address"));
            }
        }
        Field::ProblemStatement | Field::ProposedSolution | Field::TargetUsers | Field::Innovation => {
            let value = form.text(field).unwrap_or_default();
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, format!("{} is required", field.label())));
            } else if value.chars().count() > MAX_ABSTRACT_CHARS {
                errors.push(FieldError::new(
                    field,
                    format!(
                        "{} must not exceed {MAX_ABSTRACT_CHARS} characters",
                        field.label()
                    ),
                ));
            }
        }
        Field::PptLink => {
            if let Err(message) = check_drive_link(&form.ppt_link) {
                errors.push(FieldError::new(field, message));
            }
        }
        Field::Resources => {
            for (index, item) in form.resources.iter().enumerate() {
                check_resource(index, item, errors);
            }
        }
        Field::Consent => {
            if !form.consent {
                errors.push(FieldError::new(field, "Consent is required"));
            }
        }
    }
}

fn check_resource(index: usize, item: &ResourceItem, errors: &mut Vec<FieldError>) {
    if let Some(cost) = item.cost
        && (!cost.is_finite() || cost < 0.0)
    {
        errors.push(FieldError::resource(index, "Cost must be a positive number"));
    }
    if let Some(link) = item.link.as_deref()
        && link.trim().chars().count() > MAX_LINK_CHARS
    {
        errors.push(FieldError::resource(
            index,
            "Link must be under 2048 characters",
        ));
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Syntactic email check; no DNS or mailbox verification.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.starts_with('.') && !value.contains("..") && EMAIL_RE.is_match(value)
}

/// Checks that `link` is an http(s) URL hosted on a recognized cloud drive.
pub fn check_drive_link(link: &str) -> Result<(), &'static str> {
    let link = link.trim();
    if link.is_empty() {
        return Err("PPT drive link is required");
    }

    let url = Url::parse(link).map_err(|_| "Please enter a valid URL")?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("Please enter a valid URL");
    }

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let recognized = CLOUD_DRIVE_HOSTS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")));
    if !recognized {
        return Err("Please provide a valid Google Drive link");
    }
    Ok(())
}
