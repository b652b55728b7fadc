use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A requested resource line item. Deleted together with its application.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resource_request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub application_id: i32,
    #[sea_orm(belongs_to, from = "application_id", to = "id", on_delete = "Cascade")]
    pub application: HasOne<super::application::Entity>,

    pub resource_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Non-negative, zero when the applicant left it blank.
    pub cost: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub link: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
