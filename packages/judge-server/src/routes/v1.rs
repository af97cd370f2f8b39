use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .routes(routes!(handlers::run::run_code))
        .routes(routes!(handlers::score::list_scores))
        .merge(contest_routes())
        .merge(submission_routes())
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::contest::finalize_contest))
        .routes(routes!(handlers::submission::list_contest_submissions))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::submission::submit_solution))
        .routes(routes!(handlers::submission::get_submission))
}
