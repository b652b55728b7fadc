use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound for the four free-text abstract answers, in characters.
pub const MAX_ABSTRACT_CHARS: usize = 300;
/// Minimum length of a contact number, in characters.
pub const MIN_CONTACT_CHARS: usize = 10;
/// Upper bound for a resource link, in characters.
pub const MAX_LINK_CHARS: usize = 2048;
/// Largest slide deck accepted as an upload (20 MB).
pub const MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;
/// Lowercase extensions accepted for an uploaded slide deck.
pub const ATTACHMENT_EXTENSIONS: &[&str] = &["ppt", "pptx", "pdf"];
/// Hosts accepted for the slide-deck link.
pub const CLOUD_DRIVE_HOSTS: &[&str] = &["drive.google.com", "docs.google.com"];

/// Multipart part name carrying the optional slide deck.
pub const ATTACHMENT_FIELD: &str = "pptFile";

/// A field of the intake form, identified by its multipart part name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    FullName,
    RegisterNumber,
    ContactNumber,
    Email,
    SchoolDepartment,
    YearOfStudy,
    StartupName,
    ProblemStatement,
    ProposedSolution,
    TargetUsers,
    Innovation,
    PptLink,
    FacultyName,
    FacultyDepartment,
    FacultyEmail,
    FacultyContact,
    FacultyEmployeeId,
    Resources,
    Consent,
}

impl Field {
    /// Fields carried as plain text parts.
    pub const TEXT: [Field; 17] = [
        Field::FullName,
        Field::RegisterNumber,
        Field::ContactNumber,
        Field::Email,
        Field::SchoolDepartment,
        Field::YearOfStudy,
        Field::StartupName,
        Field::ProblemStatement,
        Field::ProposedSolution,
        Field::TargetUsers,
        Field::Innovation,
        Field::PptLink,
        Field::FacultyName,
        Field::FacultyDepartment,
        Field::FacultyEmail,
        Field::FacultyContact,
        Field::FacultyEmployeeId,
    ];

    /// Every field, in form order.
    pub const ALL: [Field; 19] = [
        Field::FullName,
        Field::RegisterNumber,
        Field::ContactNumber,
        Field::Email,
        Field::SchoolDepartment,
        Field::YearOfStudy,
        Field::StartupName,
        Field::ProblemStatement,
        Field::ProposedSolution,
        Field::TargetUsers,
        Field::Innovation,
        Field::PptLink,
        Field::FacultyName,
        Field::FacultyDepartment,
        Field::FacultyEmail,
        Field::FacultyContact,
        Field::FacultyEmployeeId,
        Field::Resources,
        Field::Consent,
    ];

    /// Multipart part name.
    pub fn name(self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::RegisterNumber => "registerNumber",
            Field::ContactNumber => "contactNumber",
            Field::Email => "email",
            Field::SchoolDepartment => "schoolDepartment",
            Field::YearOfStudy => "yearOfStudy",
            Field::StartupName => "startupName",
            Field::ProblemStatement => "problemStatement",
            Field::ProposedSolution => "proposedSolution",
            Field::TargetUsers => "targetUsers",
            Field::Innovation => "innovation",
            Field::PptLink => "pptLink",
            Field::FacultyName => "facultyName",
            Field::FacultyDepartment => "facultyDepartment",
            Field::FacultyEmail => "facultyEmail",
            Field::FacultyContact => "facultyContact",
            Field::FacultyEmployeeId => "facultyEmployeeId",
            Field::Resources => "resources",
            Field::Consent => "consent",
        }
    }

    /// Human-readable label used in prompts and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full name",
            Field::RegisterNumber => "Register number",
            Field::ContactNumber => "Contact number",
            Field::Email => "Email",
            Field::SchoolDepartment => "School/Department",
            Field::YearOfStudy => "Year of study",
            Field::StartupName => "Startup/Idea name",
            Field::ProblemStatement => "Problem statement",
            Field::ProposedSolution => "Proposed solution",
            Field::TargetUsers => "Target users/market",
            Field::Innovation => "Innovation/uniqueness",
            Field::PptLink => "PPT drive link",
            Field::FacultyName => "Faculty name",
            Field::FacultyDepartment => "Faculty department",
            Field::FacultyEmail => "Faculty email",
            Field::FacultyContact => "Faculty contact number",
            Field::FacultyEmployeeId => "Employee ID",
            Field::Resources => "Resources",
            Field::Consent => "Consent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// One requested resource line item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceItem {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent, `null` and `""` all mean zero.
    #[serde(default, deserialize_with = "lenient_cost")]
    pub cost: Option<f64>,
    #[serde(default)]
    pub link: Option<String>,
}

impl ResourceItem {
    pub fn cost_or_zero(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }

    /// Trims text attributes and turns blank ones into `None`.
    pub fn normalized(&self) -> Self {
        Self {
            resource_name: non_blank(self.resource_name.as_deref()),
            description: non_blank(self.description.as_deref()),
            cost: self.cost,
            link: non_blank(self.link.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Accepts a JSON number, a numeric string, an empty string or `null`.
fn lenient_cost<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("cost '{s}' is not a number"))),
    }
}

/// Everything the applicant enters, keyed by [`Field`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationForm {
    // Student details
    pub full_name: String,
    pub register_number: String,
    pub contact_number: String,
    pub email: String,
    pub school_department: String,
    pub year_of_study: String,

    // Startup abstract
    pub startup_name: String,
    pub problem_statement: String,
    pub proposed_solution: String,
    pub target_users: String,
    pub innovation: String,
    pub ppt_link: String,

    // Faculty mentor
    pub faculty_name: String,
    pub faculty_department: String,
    pub faculty_email: String,
    pub faculty_contact: String,
    pub faculty_employee_id: String,

    pub resources: Vec<ResourceItem>,
    pub consent: bool,
}

/// The `resources` part did not hold a JSON array of resource items.
#[derive(Debug, thiserror::Error)]
#[error("invalid resources payload: {0}")]
pub struct ResourcesFormatError(#[from] serde_json::Error);

impl ApplicationForm {
    /// Value of a text field, `None` for `Resources` and `Consent`.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::FullName => &self.full_name,
            Field::RegisterNumber => &self.register_number,
            Field::ContactNumber => &self.contact_number,
            Field::Email => &self.email,
            Field::SchoolDepartment => &self.school_department,
            Field::YearOfStudy => &self.year_of_study,
            Field::StartupName => &self.startup_name,
            Field::ProblemStatement => &self.problem_statement,
            Field::ProposedSolution => &self.proposed_solution,
            Field::TargetUsers => &self.target_users,
            Field::Innovation => &self.innovation,
            Field::PptLink => &self.ppt_link,
            Field::FacultyName => &self.faculty_name,
            Field::FacultyDepartment => &self.faculty_department,
            Field::FacultyEmail => &self.faculty_email,
            Field::FacultyContact => &self.faculty_contact,
            Field::FacultyEmployeeId => &self.faculty_employee_id,
            Field::Resources | Field::Consent => return None,
        };
        Some(value)
    }

    /// Sets a text field. Returns `false` for non-text fields.
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) -> bool {
        let slot = match field {
            Field::FullName => &mut self.full_name,
            Field::RegisterNumber => &mut self.register_number,
            Field::ContactNumber => &mut self.contact_number,
            Field::Email => &mut self.email,
            Field::SchoolDepartment => &mut self.school_department,
            Field::YearOfStudy => &mut self.year_of_study,
            Field::StartupName => &mut self.startup_name,
            Field::ProblemStatement => &mut self.problem_statement,
            Field::ProposedSolution => &mut self.proposed_solution,
            Field::TargetUsers => &mut self.target_users,
            Field::Innovation => &mut self.innovation,
            Field::PptLink => &mut self.ppt_link,
            Field::FacultyName => &mut self.faculty_name,
            Field::FacultyDepartment => &mut self.faculty_department,
            Field::FacultyEmail => &mut self.faculty_email,
            Field::FacultyContact => &mut self.faculty_contact,
            Field::FacultyEmployeeId => &mut self.faculty_employee_id,
            Field::Resources | Field::Consent => return false,
        };
        *slot = value.into();
        true
    }

    /// Appends an empty resource row and returns its index.
    pub fn add_resource(&mut self) -> usize {
        self.resources.push(ResourceItem {
            cost: Some(0.0),
            ..Default::default()
        });
        self.resources.len() - 1
    }

    /// Replaces the row at `index`. Returns `false` when out of range.
    pub fn update_resource(&mut self, index: usize, item: ResourceItem) -> bool {
        match self.resources.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove_resource(&mut self, index: usize) -> Option<ResourceItem> {
        (index < self.resources.len()).then(|| self.resources.remove(index))
    }

    pub fn total_cost(&self) -> f64 {
        self.resources
            .iter()
            .map(ResourceItem::cost_or_zero)
            .fold(0.0, |acc, cost| acc + cost)
    }

    /// Flattens the form into multipart text parts, in form order.
    pub fn to_wire(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut parts: Vec<(&'static str, String)> = Field::TEXT
            .into_iter()
            .map(|f| (f.name(), self.text(f).unwrap_or_default().to_string()))
            .collect();
        parts.push((Field::Resources.name(), serde_json::to_string(&self.resources)?));
        parts.push((Field::Consent.name(), self.consent.to_string()));
        Ok(parts)
    }

    /// Rebuilds a form from received multipart text parts.
    ///
    /// Missing text parts become empty strings so validation can report them;
    /// a missing or empty `resources` part is an empty list.
    pub fn from_wire(parts: &HashMap<String, String>) -> Result<Self, ResourcesFormatError> {
        let mut form = ApplicationForm::default();
        for field in Field::TEXT {
            if let Some(value) = parts.get(field.name()) {
                form.set_text(field, value.as_str());
            }
        }
        form.resources = parse_resources(
            parts
                .get(Field::Resources.name())
                .map(String::as_str)
                .unwrap_or_default(),
        )?;
        form.consent = parts
            .get(Field::Consent.name())
            .is_some_and(|v| v.trim() == "true");
        Ok(form)
    }
}

/// Parses the JSON-encoded resource list.
pub fn parse_resources(raw: &str) -> Result<Vec<ResourceItem>, ResourcesFormatError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}
