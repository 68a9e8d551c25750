use actix_web::{web, HttpRequest, HttpResponse};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::task::parse_date;
use crate::models::user::{LoginRequest, RegisterRequest, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub username: String,
    pub exp: usize,
}

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"))
}

// JWT Creation
pub fn create_jwt(user: &User, secret: &str, ttl_hours: i64) -> AppResult<String> {
    let expiration = Utc::now() + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        exp: expiration.timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

// JWT Validation
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// POST /api/auth/register
pub async fn register(
    data: web::Data<AppState>,
    payload: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let (username, email, password) = match (
        required(payload.username),
        required(payload.email).map(|e| e.to_lowercase()),
        payload.password.filter(|p| !p.is_empty()),
    ) {
        (Some(u), Some(e), Some(p)) => (u, e, p),
        _ => {
            return Err(AppError::Validation(
                "Username, email, and password are required".to_string(),
            ))
        }
    };
    if !email_pattern().is_match(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    let date_of_birth = payload.date_of_birth.as_deref().map(parse_date).transpose()?;
    let date_of_joining = payload.date_of_joining.as_deref().map(parse_date).transpose()?;

    let cost = data.config.bcrypt_cost;
    let hashed_password = web::block(move || hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user = data
        .users
        .create(User::new(username, email, hashed_password, date_of_birth, date_of_joining))
        .await?;
    info!("Registered user {} ({})", user.username, user.id);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User Registered Successfully",
        "data": {
            "username": user.username,
            "email": user.email,
            "dateOfBirth": user.date_of_birth,
            "dateOfJoining": user.date_of_joining,
        },
    })))
}

/// POST /api/auth/login
pub async fn login(
    data: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let (email, password) = match (required(payload.email), payload.password) {
        (Some(e), Some(p)) => (e.to_lowercase(), p),
        _ => return Err(AppError::Validation("Email and password are required".to_string())),
    };

    let Some(user) = data.users.find_by_email(&email).await? else {
        warn!("Login attempt for unknown email");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let stored_hash = user.password.clone();
    let matches = web::block(move || verify(password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    if !matches {
        warn!("Wrong password for user {}", user.id);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = create_jwt(&user, &data.config.jwt_secret, data.config.token_ttl_hours)?;
    info!("User {} logged in", user.id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User logged in successfully",
        "username": user.username,
        "email": user.email,
        "token": token,
    })))
}

/// GET /api/auth/status
pub async fn status(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let user = data
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized user".to_string()))?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User logged in successfully",
        "username": user.username,
    })))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; this only confirms the caller was authenticated.
/// The client drops its copy of the token.
pub async fn logout(req: HttpRequest) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    info!("User {} logged out", user_id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Logout Successful" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("ada".into(), "ada@example.com".into(), "h".into(), None, None)
    }

    #[test]
    fn jwt_round_trip() {
        let u = user();
        let token = create_jwt(&u, "secret", 1).unwrap();
        let claims = validate_jwt(&token, "secret").unwrap();
        assert_eq!(claims.sub, u.id);
        assert_eq!(claims.username, "ada");
    }

    #[test]
    fn jwt_rejects_wrong_secret_and_expired() {
        let token = create_jwt(&user(), "secret", 1).unwrap();
        assert!(validate_jwt(&token, "other").is_err());

        let expired = create_jwt(&user(), "secret", -2).unwrap();
        assert!(validate_jwt(&expired, "secret").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email_pattern().is_match("a@b.io"));
        assert!(!email_pattern().is_match("not-an-email"));
        assert!(!email_pattern().is_match("a b@c.d"));
    }
}
