use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(question_routes())
        .merge(command_routes())
        .merge(user_routes())
        .merge(badge_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn question_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::question::create_question))
        .routes(routes!(
            handlers::question::get_question,
            handlers::question::update_question
        ))
        .routes(routes!(handlers::question::close_question))
        .routes(routes!(handlers::question::reopen_question))
        .routes(routes!(handlers::question::create_answer))
        .routes(routes!(handlers::question::update_answer))
        .routes(routes!(handlers::question::comment_question))
        .routes(routes!(handlers::question::comment_answer))
        .routes(routes!(handlers::question::delete_comment))
}

fn command_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::command::vote))
        .routes(routes!(handlers::command::mark_tag))
        .routes(routes!(handlers::command::run_command))
        .routes(routes!(handlers::command::read_messages))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::get_user))
        .routes(routes!(handlers::user::update_status))
        .routes(routes!(
            handlers::user::reputation_history,
            handlers::user::moderate_reputation
        ))
        .routes(routes!(handlers::user::list_notifications))
        .routes(routes!(handlers::user::list_messages))
}

fn badge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::badge::list_badges))
        .routes(routes!(handlers::badge::award_badge))
}
