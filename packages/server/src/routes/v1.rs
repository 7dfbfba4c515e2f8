use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/contests", contest_routes())
        .nest("/judging", judging_routes())
        .nest("/entries", entry_routes())
        .nest("/groups", group_routes())
        .nest("/evaluators", evaluator_routes())
        .nest("/settings", settings_routes())
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::partition::assign_all))
        .routes(routes!(handlers::partition::assign_new))
        .routes(routes!(handlers::partition::transfer))
        .routes(routes!(handlers::progress::user_progress))
        .routes(routes!(handlers::progress::group_progress))
        .routes(routes!(handlers::progress::entry_progress))
        .routes(routes!(handlers::progress::evaluation_progress))
        .routes(routes!(handlers::progress::evaluator_progress))
}

fn judging_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::judging::claim_next,
            handlers::judging::release_claim
        ))
        .routes(routes!(handlers::judging::next_entry_to_review_level))
        .routes(routes!(handlers::judging::submit_evaluation))
        .routes(routes!(handlers::judging::edit_evaluation))
        .routes(routes!(handlers::progress::overview))
}

fn entry_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::entry::auto_update_level))
        .routes(routes!(handlers::entry::set_level))
        .routes(routes!(handlers::entry::flag_entry))
        .routes(routes!(handlers::entry::approve_entry))
        .routes(routes!(handlers::entry::disqualify_entry))
        .routes(routes!(
            handlers::entry::add_winner,
            handlers::entry::remove_winner
        ))
}

fn group_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::group::list_groups,
            handlers::group::create_group
        ))
        .routes(routes!(handlers::group::update_group))
}

fn evaluator_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::group::assign_evaluator_group))
}

fn settings_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::settings::get_current_contest,
        handlers::settings::set_current_contest
    ))
}
