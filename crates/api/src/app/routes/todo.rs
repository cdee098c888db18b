//! `/api/todo`: one repository call per HTTP verb.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::Response,
    Json,
};

use todoboard_core::{NewTodo, Todo, TodoFilter, TodoId, TodoPatch};

use crate::app::dto::{CreateTodoRequest, TodoQuery, UpdateTodoRequest};
use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;

/// Verbs served by `/api/todo`, as advertised in `Allow`.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE";

type Payload<T> = Result<Json<T>, JsonRejection>;
type Params = Result<Query<Vec<(String, String)>>, QueryRejection>;

fn todo_query(params: Params) -> Result<TodoQuery, ApiError> {
    let Query(pairs) = params?;
    Ok(TodoQuery::from_pairs(pairs))
}

pub async fn list_todos(
    Extension(services): Extension<Arc<AppServices>>,
    params: Params,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let query = todo_query(params)?;
    let filter = TodoFilter::from_query(query.completed.as_deref());

    let todos = services.todos().find_many(filter).await?;
    Ok(Json(todos))
}

pub async fn create_todo(
    Extension(services): Extension<Arc<AppServices>>,
    body: Payload<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = body?;
    let new = NewTodo {
        text: body.text,
        completed: body.completed,
        created_by_id: None,
    };

    let todo = services.todos().create(new).await?;
    tracing::debug!(todo_id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn update_todo(
    Extension(services): Extension<Arc<AppServices>>,
    params: Params,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Todo>, ApiError> {
    let query = todo_query(params)?;
    let id: TodoId = query.id().ok_or(ApiError::MissingParam("id"))?.parse()?;
    let body = UpdateTodoRequest::from_body(&headers, &body?)?;

    let todo = services
        .todos()
        .update(id, TodoPatch { completed: body.completed })
        .await?;
    Ok(Json(todo))
}

/// Deletes the row named by `?id=`, or every row when `id` is absent or empty.
pub async fn delete_todos(
    Extension(services): Extension<Arc<AppServices>>,
    params: Params,
) -> Result<StatusCode, ApiError> {
    let query = todo_query(params)?;

    match query.id() {
        Some(raw) => {
            let id: TodoId = raw.parse()?;
            services.todos().delete(id).await?;
        }
        None => {
            let deleted = services.todos().delete_many().await?;
            tracing::info!(deleted, "deleted all todos");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn method_not_allowed(method: Method) -> Response {
    let mut res = errors::json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Method {method} Not Allowed"),
    );
    res.headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    res
}
