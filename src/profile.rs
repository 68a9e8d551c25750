// src/profile.rs

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use log::info;
use serde_json::json;

use crate::app_state::AppState;
use crate::board;
use crate::error::{AppError, AppResult};
use crate::middleware::current_user;
use crate::models::user::{Profile, ProfileUpdate, User};

const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;

/// Whole years from `date_of_joining` to `now` on a 365.25-day year.
/// Zero when unset or in the future.
pub fn experience_years(date_of_joining: Option<NaiveDate>, now: DateTime<Utc>) -> i64 {
    let Some(joined) = date_of_joining else {
        return 0;
    };
    let joined = joined.and_time(NaiveTime::MIN).and_utc();
    let elapsed = (now - joined).num_seconds();
    if elapsed <= 0 {
        return 0;
    }
    (elapsed as f64 / SECONDS_PER_YEAR).floor() as i64
}

impl Profile {
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Profile {
            username: user.username.clone(),
            email: user.email.clone(),
            date_of_birth: user.date_of_birth,
            date_of_joining: user.date_of_joining,
            experience: experience_years(user.date_of_joining, now),
            created_at: user.created_at,
            updated_at: user.updated_at,
            manager: user.manager.clone(),
            domain: user.domain.clone(),
            team: user.team.clone(),
            role: user.role.clone(),
            bio: user.bio.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            avatar_data_url: user.avatar_data_url.clone(),
        }
    }
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }

    /// Field name and new value for every field present in the update.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("manager", &self.manager),
            ("domain", &self.domain),
            ("team", &self.team),
            ("role", &self.role),
            ("bio", &self.bio),
            ("phone", &self.phone),
            ("location", &self.location),
            ("avatarDataUrl", &self.avatar_data_url),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }

    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        let targets: [(&Option<String>, &mut String); 8] = [
            (&self.manager, &mut user.manager),
            (&self.domain, &mut user.domain),
            (&self.team, &mut user.team),
            (&self.role, &mut user.role),
            (&self.bio, &mut user.bio),
            (&self.phone, &mut user.phone),
            (&self.location, &mut user.location),
            (&self.avatar_data_url, &mut user.avatar_data_url),
        ];
        for (value, field) in targets {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        user.updated_at = now;
    }
}

async fn load_user(data: &AppState, user_id: &str) -> AppResult<User> {
    data.users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))
}

/// GET /api/profile
pub async fn get_profile(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let user = load_user(&data, &user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": Profile::from_user(&user, Utc::now()),
    })))
}

/// PUT /api/profile
pub async fn update_profile(
    req: HttpRequest,
    data: web::Data<AppState>,
    payload: web::Json<ProfileUpdate>,
) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let update = payload.into_inner();

    let user = if update.is_empty() {
        load_user(&data, &user_id).await?
    } else {
        data.users
            .update_profile(&user_id, &update)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?
    };
    info!("Profile updated for user {}", user_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": Profile::from_user(&user, Utc::now()),
    })))
}

/// GET /api/profile/stats
pub async fn get_stats(req: HttpRequest, data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let user_id = current_user(&req)?;
    let now = Utc::now();
    let since = now - Duration::days(board::STATS_WINDOW_DAYS);
    let tasks = data.tasks.list_created_since(&user_id, since).await?;
    let stats = board::stats(&tasks, now);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "last30Days": stats,
            "productivity": stats.productivity,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        let mut u = User::new(
            "ada".into(),
            "ada@example.com".into(),
            "hash".into(),
            NaiveDate::from_ymd_opt(1990, 1, 2),
            None,
        );
        u.manager = "grace".into();
        u.team = "core".into();
        u
    }

    #[test]
    fn experience_is_zero_without_joining_date() {
        assert_eq!(experience_years(None, Utc::now()), 0);
    }

    #[test]
    fn experience_counts_whole_years() {
        let now = DateTime::parse_from_rfc3339("2024-06-15T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ten_years_ago = NaiveDate::from_ymd_opt(2014, 6, 10);
        assert_eq!(experience_years(ten_years_ago, now), 10);

        let almost_two = NaiveDate::from_ymd_opt(2022, 7, 1);
        assert_eq!(experience_years(almost_two, now), 1);

        let tomorrow = (now + Duration::days(1)).date_naive();
        assert_eq!(experience_years(Some(tomorrow), now), 0);
    }

    #[test]
    fn update_only_touches_present_fields() {
        let mut u = user();
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"bio":"hello","username":"mallory","dateOfBirth":"2001-01-01"}"#)
                .unwrap();
        update.apply(&mut u, Utc::now());

        assert_eq!(u.bio, "hello");
        assert_eq!(u.manager, "grace");
        assert_eq!(u.team, "core");
        assert_eq!(u.username, "ada");
        assert_eq!(u.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 2));
    }

    #[test]
    fn update_fields_lists_present_values() {
        let update = ProfileUpdate {
            bio: Some("hi".into()),
            avatar_data_url: Some("data:image/png;base64,AA==".into()),
            ..Default::default()
        };
        assert_eq!(
            update.fields(),
            vec![("bio", "hi"), ("avatarDataUrl", "data:image/png;base64,AA==")]
        );
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn profile_hides_password() {
        let value = serde_json::to_value(Profile::from_user(&user(), Utc::now())).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["username"], "ada");
        assert_eq!(value["experience"], 0);
        assert_eq!(value["dateOfBirth"], "1990-01-02");
    }
}
