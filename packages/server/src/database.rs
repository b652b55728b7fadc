use std::time::Duration;

use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema};
use tracing::{info, warn};

use crate::entity::{application, resource_request};

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;
    ensure_indexes(&db).await;

    Ok(db)
}

/// Create the application tables if they do not exist yet.
///
/// `application` must come first: `resource_request` references it.
pub async fn sync_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut applications = schema.create_table_from_entity(application::Entity);
    applications.if_not_exists();
    db.execute_raw(backend.build(&applications)).await?;

    let mut resources = schema.create_table_from_entity(resource_request::Entity);
    resources.if_not_exists();
    db.execute_raw(backend.build(&resources)).await?;

    Ok(())
}

/// Ensure the lookup index on `resource_request.application_id` exists.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) {
    let backend = db.get_database_backend();
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_resource_request_application")
        .table(resource_request::Entity)
        .col(resource_request::Column::ApplicationId)
        .to_owned();

    match db.execute_raw(backend.build(&stmt)).await {
        Ok(_) => info!("Ensured index idx_resource_request_application exists"),
        Err(e) => warn!(
            "Failed to create index idx_resource_request_application: {}",
            e
        ),
    }
}
