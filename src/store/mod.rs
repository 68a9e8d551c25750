// src/store/mod.rs

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::board::DateRange;
use crate::error::AppResult;
use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{ProfileUpdate, User};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Task persistence. Every operation is scoped to `owner`; a task owned by
/// someone else behaves exactly like a missing one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_by_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Task>>;

    async fn list_range(&self, owner: &str, range: DateRange) -> AppResult<Vec<Task>>;

    async fn list_all(&self, owner: &str) -> AppResult<Vec<Task>>;

    /// Tasks whose `createdAt` is at or after `since`.
    async fn list_created_since(&self, owner: &str, since: DateTime<Utc>) -> AppResult<Vec<Task>>;

    async fn insert(&self, owner: &str, task: NewTask) -> AppResult<Task>;

    /// Returns `None` when no task with `id` belongs to `owner`.
    async fn set_status(&self, owner: &str, id: &str, status: TaskStatus) -> AppResult<Option<Task>>;

    async fn update(&self, owner: &str, id: &str, changes: &TaskChanges) -> AppResult<Option<Task>>;

    /// Returns `false` when no task with `id` belongs to `owner`.
    async fn delete(&self, owner: &str, id: &str) -> AppResult<bool>;
}

/// User persistence. Username and email are unique.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `AppError::Duplicate` if the username or email is taken.
    async fn create(&self, user: User) -> AppResult<User>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> AppResult<Option<User>>;

    async fn set_dates(
        &self,
        email: &str,
        date_of_birth: NaiveDate,
        date_of_joining: NaiveDate,
    ) -> AppResult<Option<User>>;
}
