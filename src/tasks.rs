// src/tasks.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;
use crate::board::{self, Board, DateRange, DEFAULT_PAGE_LIMIT};
use crate::error::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::task::{
    parse_date, CreateTaskRequest, NewTask, TaskChanges, TaskStatus, UpdateStatusRequest,
    UpdateTaskRequest,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/tasks/date/{date}
/// One day's board for the caller.
pub async fn get_tasks_by_date(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let date = parse_date(&path.into_inner())?;

    let tasks = data.tasks.list_by_date(&user_id, date).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": Board::from_tasks(tasks),
    })))
}

/// POST /api/tasks
pub async fn create_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<CreateTaskRequest>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let new_task = NewTask::try_from(payload.into_inner())?;

    let task = data.tasks.insert(&user_id, new_task).await?;
    info!("Task created: {} ({}) for {}", task.id, task.status, user_id);
    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Task created successfully",
        "data": task,
    })))
}

/// PUT /api/tasks/{task_id}/status
/// Move a task to another column.
pub async fn update_task_status(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusRequest>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let task_id = path.into_inner();
    let status: TaskStatus = payload
        .status
        .as_deref()
        .ok_or_else(|| AppError::Validation("Status is required".to_string()))?
        .parse()?;

    debug!("Moving task {} to {} for {}", task_id, status, user_id);
    let task = data
        .tasks
        .set_status(&user_id, &task_id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Task"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task status updated successfully",
        "data": task,
    })))
}

/// PUT /api/tasks/{task_id}
/// Edit any subset of a task's fields.
pub async fn update_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequest>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let task_id = path.into_inner();
    let changes = TaskChanges::try_from(payload.into_inner())?;
    if changes.is_empty() {
        return Err(AppError::Validation("No fields to update".to_string()));
    }

    let task = data
        .tasks
        .update(&user_id, &task_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Task"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task updated successfully",
        "data": task,
    })))
}

/// DELETE /api/tasks/{task_id}
pub async fn delete_task(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let task_id = path.into_inner();

    if !data.tasks.delete(&user_id, &task_id).await? {
        return Err(AppError::not_found("Task"));
    }
    info!("Task deleted: {} by {}", task_id, user_id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}

/// GET /api/tasks?page=&limit=
/// Every task the caller owns, across dates.
pub async fn list_tasks(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let tasks = data.tasks.list_all(&user_id).await?;
    let (items, pagination) = board::paginate(
        tasks,
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    );
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": items,
        "pagination": pagination,
    })))
}

/// GET /api/tasks/history?start=&end=
/// Per-day productivity, defaulting to the last ten days.
pub async fn get_history(
    req: HttpRequest,
    data: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let today = Utc::now().date_naive();
    let range = match (query.start.as_deref(), query.end.as_deref()) {
        (None, None) => DateRange::recent(today),
        (start, end) => {
            let end = end.map(parse_date).transpose()?.unwrap_or(today);
            let start = match start {
                Some(s) => parse_date(s)?,
                None => DateRange::recent(end).start,
            };
            DateRange::new(start, end)?
        }
    };

    let tasks = data.tasks.list_range(&user_id, range).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": board::history(tasks, range),
    })))
}
