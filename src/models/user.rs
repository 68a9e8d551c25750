use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user as stored. Never serialized into a response; handlers
/// return a `Profile` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash.
    pub password: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub avatar_data_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: String,
        email: String,
        password_hash: String,
        date_of_birth: Option<NaiveDate>,
        date_of_joining: Option<NaiveDate>,
    ) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password: password_hash,
            date_of_birth,
            date_of_joining,
            manager: String::new(),
            domain: String::new(),
            team: String::new(),
            role: String::new(),
            bio: String::new(),
            phone: String::new(),
            location: String::new(),
            avatar_data_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The editable subset of a profile. Anything else in the request body,
/// including `username` or `dateOfBirth`, is dropped by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub manager: Option<String>,
    pub domain: Option<String>,
    pub team: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub avatar_data_url: Option<String>,
}

/// Profile as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_joining: Option<NaiveDate>,
    pub experience: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub manager: String,
    pub domain: String,
    pub team: String,
    pub role: String,
    pub bio: String,
    pub phone: String,
    pub location: String,
    pub avatar_data_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_of_joining: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatesRequest {
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_of_joining: Option<String>,
}
