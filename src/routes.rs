// src/routes.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::admin::{get_user_by_email, update_user_dates};
use crate::app_state::AppState;
use crate::auth::{login, logout, register, status};
use crate::error::AppError;
use crate::middleware::Authentication;
use crate::profile::{get_profile, get_stats, update_profile};
use crate::tasks::{
    create_task, delete_task, get_history, get_tasks_by_date, list_tasks, update_task,
    update_task_status,
};

/// GET /api/health
pub async fn health(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Server is running",
        "status": "OK",
        "instance": data.config.instance_id,
        "port": data.config.port,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Route table. Extractor failures (bad JSON, bad query strings) surface as
/// 400s in the usual error envelope.
pub fn configure(cfg: &mut web::ServiceConfig, jwt_secret: &str) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(10 * 1024 * 1024)
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .route("/api/health", web::get().to(health))
    .service(
        web::scope("/api/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .service(
                web::resource("/status")
                    .wrap(Authentication::new(jwt_secret))
                    .route(web::get().to(status)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Authentication::new(jwt_secret))
                    .route(web::post().to(logout)),
            ),
    )
    // TASKS
    .service(
        web::scope("/api/tasks")
            .wrap(Authentication::new(jwt_secret))
            .route("", web::get().to(list_tasks))
            .route("", web::post().to(create_task))
            .route("/date/{date}", web::get().to(get_tasks_by_date))
            .route("/history", web::get().to(get_history))
            .route("/{task_id}/status", web::put().to(update_task_status))
            .route("/{task_id}", web::put().to(update_task))
            .route("/{task_id}", web::delete().to(delete_task)),
    )
    // PROFILE
    .service(
        web::scope("/api/profile")
            .wrap(Authentication::new(jwt_secret))
            .route("", web::get().to(get_profile))
            .route("", web::put().to(update_profile))
            .route("/stats", web::get().to(get_stats)),
    )
    // ADMIN
    .service(
        web::scope("/api/admin")
            .wrap(Authentication::new(jwt_secret))
            .route("/user/dates", web::put().to(update_user_dates))
            .route("/user/{email}", web::get().to(get_user_by_email)),
    );
}
