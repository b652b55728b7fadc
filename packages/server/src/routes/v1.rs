use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/applications", application_routes(config))
}

fn application_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let submit = OpenApiRouter::new()
        .routes(routes!(handlers::application::submit_application))
        .layer(handlers::application::application_body_limit(
            config.storage.max_upload_size,
        ));

    OpenApiRouter::new()
        .routes(routes!(handlers::application::get_application))
        .merge(submit)
}
