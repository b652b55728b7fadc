use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    // Student details
    pub full_name: String,
    pub register_number: String,
    pub contact_number: String,
    pub email: String,
    pub school_department: String,
    pub year_of_study: String,

    // Startup abstract, each answer at most 300 characters
    pub startup_name: String,
    #[sea_orm(column_type = "Text")]
    pub problem_statement: String,
    #[sea_orm(column_type = "Text")]
    pub proposed_solution: String,
    #[sea_orm(column_type = "Text")]
    pub target_users: String,
    #[sea_orm(column_type = "Text")]
    pub innovation: String,
    #[sea_orm(column_type = "Text")]
    pub ppt_link: String,
    /// Public URL of the uploaded deck, NULL when only a link was given.
    #[sea_orm(column_type = "Text", nullable)]
    pub ppt_file_url: Option<String>,

    // Faculty mentor
    pub faculty_name: String,
    pub faculty_department: String,
    pub faculty_email: String,
    pub faculty_contact: String,
    pub faculty_employee_id: String,

    pub consent: bool,

    #[sea_orm(has_many)]
    pub resources: HasMany<super::resource_request::Entity>,

    pub submitted_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
