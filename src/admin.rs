// src/admin.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::info;
use serde_json::json;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::task::parse_date;
use crate::models::user::{Profile, UpdateDatesRequest};
use crate::profile::experience_years;

/// GET /api/admin/user/{email}
pub async fn get_user_by_email(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    current_user(&req)?;
    let email = path.into_inner().trim().to_lowercase();
    let user = data
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": Profile::from_user(&user, Utc::now()),
    })))
}

/// PUT /api/admin/user/dates
/// The only path that changes a user's birth and joining dates after signup.
pub async fn update_user_dates(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<UpdateDatesRequest>,
) -> AppResult<HttpResponse> {
    let admin_id = current_user(&req)?;
    let payload = payload.into_inner();
    let (email, dob, doj) = match (payload.email, payload.date_of_birth, payload.date_of_joining) {
        (Some(e), Some(b), Some(j)) if !e.trim().is_empty() => (e.trim().to_lowercase(), b, j),
        _ => {
            return Err(AppError::Validation(
                "email, dateOfBirth, and dateOfJoining are required".to_string(),
            ))
        }
    };
    let date_of_birth = parse_date(&dob)?;
    let date_of_joining = parse_date(&doj)?;

    let user = data
        .users
        .set_dates(&email, date_of_birth, date_of_joining)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    info!("User {} dates updated by {}", user.id, admin_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User dates updated successfully",
        "data": {
            "email": user.email,
            "username": user.username,
            "dateOfBirth": user.date_of_birth,
            "dateOfJoining": user.date_of_joining,
            "experience": experience_years(user.date_of_joining, Utc::now()),
        },
    })))
}
