use axum::{routing::get, Router};

pub mod system;
pub mod todo;

/// Router for everything under `/api`.
///
/// HEAD gets its own 405 route; otherwise axum would answer it with the
/// GET handler.
pub fn router() -> Router {
    Router::new().route(
        "/todo",
        get(todo::list_todos)
            .head(todo::method_not_allowed)
            .post(todo::create_todo)
            .put(todo::update_todo)
            .delete(todo::delete_todos)
            .fallback(todo::method_not_allowed),
    )
}
