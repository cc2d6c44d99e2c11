use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::get,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        dao::{NewTodo, Page, Patch, TodoChanges},
        entities::todo::{self, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS},
    },
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, todo_service::TodoService},
    state::AppState,
};

const BASE_PATH: &str = "/todos";

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Body of `PUT` and `PATCH`. A missing key and an explicit `null` both leave
/// the column untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub completed: Patch<bool>,
}

// Raw strings so unparseable paging values fall back to defaults instead of
// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListTodosQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub completed: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TodoResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            completed: model.completed,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl From<Page<todo::Model>> for TodoListResponse {
    fn from(page: Page<todo::Model>) -> Self {
        let total_pages = page.total_pages();
        let page = page.map(TodoResponse::from);
        Self {
            todos: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(BASE_PATH, get(list_todos).post(create_todo))
        .route(
            &format!("{BASE_PATH}/{{id}}"),
            get(get_todo)
                .put(update_todo)
                .patch(update_todo)
                .delete(delete_todo),
        )
        .with_state(state)
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> ApiResult<TodoResponse> {
    let Json(body) = payload.map_err(json_rejection)?;
    let data = NewTodo {
        title: validate_title(&body.title)?,
        description: validate_description(body.description.unwrap_or_default())?,
        completed: body.completed.unwrap_or(false),
    };

    let todo = todo_service(&state).create(data).await?;
    JsonApiResponse::created(todo.into())
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> ApiResult<TodoListResponse> {
    let Query(query) = query.map_err(|err| AppError::bad_request(err.body_text()))?;
    let page = lenient_int(query.page.as_deref(), 1);
    let page_size = lenient_int(query.page_size.as_deref(), 10);
    let completed = parse_completed(query.completed.as_deref())?;

    let page = todo_service(&state)
        .list(page, page_size, completed)
        .await?;
    JsonApiResponse::ok(page.into())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TodoResponse> {
    let id = parse_id(&id)?;
    let todo = todo_service(&state).get(id).await?;
    JsonApiResponse::ok(todo.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> ApiResult<TodoResponse> {
    let id = parse_id(&id)?;
    let Json(body) = payload.map_err(json_rejection)?;
    let changes = TodoChanges {
        title: match body.title {
            Patch::Present(title) => Patch::Present(validate_title(&title)?),
            Patch::Absent => Patch::Absent,
        },
        description: match body.description {
            Patch::Present(description) => Patch::Present(validate_description(description)?),
            Patch::Absent => Patch::Absent,
        },
        completed: body.completed,
    };

    let todo = todo_service(&state).update(id, changes).await?;
    JsonApiResponse::ok(todo.into())
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    todo_service(&state).delete(id).await?;
    JsonApiResponse::no_content()
}

fn todo_service(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}

fn json_rejection(err: JsonRejection) -> AppError {
    AppError::bad_request(err.body_text())
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request("Invalid todo ID"))
}

fn validate_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("title is required"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::bad_request(format!(
            "title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: String) -> Result<String, AppError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(AppError::bad_request(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(description)
}

fn lenient_int(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_completed(raw: Option<&str>) -> Result<Option<bool>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(_) => Err(AppError::bad_request(
            "completed must be one of true, false, 1, 0",
        )),
    }
}
