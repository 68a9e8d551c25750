// src/store/memory.rs

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::board::DateRange;
use crate::error::{AppError, AppResult};
use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{ProfileUpdate, User};
use crate::store::{TaskStore, UserStore};

/// Process-local store for offline runs and tests. Tasks are kept in
/// insertion order and listed newest first.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, predicate: impl Fn(&Task) -> bool) -> AppResult<Vec<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.iter().rev().filter(|t| predicate(t)).cloned().collect())
    }

    fn modify_task(
        &self,
        owner: &str,
        id: &str,
        f: impl FnOnce(&mut Task),
    ) -> AppResult<Option<Task>> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        Ok(tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner)
            .map(|task| {
                f(task);
                task.clone()
            }))
    }

    fn modify_user(
        &self,
        predicate: impl Fn(&User) -> bool,
        f: impl FnOnce(&mut User),
    ) -> AppResult<Option<User>> {
        let mut users = self.users.write().map_err(poisoned)?;
        Ok(users.iter_mut().find(|u| predicate(u)).map(|user| {
            f(user);
            user.clone()
        }))
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("memory store lock poisoned".to_string())
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_by_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Task>> {
        self.select(|t| t.user_id == owner && t.date == date)
    }

    async fn list_range(&self, owner: &str, range: DateRange) -> AppResult<Vec<Task>> {
        self.select(|t| t.user_id == owner && range.contains(t.date))
    }

    async fn list_all(&self, owner: &str) -> AppResult<Vec<Task>> {
        self.select(|t| t.user_id == owner)
    }

    async fn list_created_since(&self, owner: &str, since: DateTime<Utc>) -> AppResult<Vec<Task>> {
        self.select(|t| t.user_id == owner && t.created_at >= since)
    }

    async fn insert(&self, owner: &str, task: NewTask) -> AppResult<Task> {
        let task = Task::new(owner, task);
        self.tasks.write().map_err(poisoned)?.push(task.clone());
        Ok(task)
    }

    async fn set_status(&self, owner: &str, id: &str, status: TaskStatus) -> AppResult<Option<Task>> {
        self.modify_task(owner, id, |task| {
            task.status = status;
            task.updated_at = Utc::now();
        })
    }

    async fn update(&self, owner: &str, id: &str, changes: &TaskChanges) -> AppResult<Option<Task>> {
        self.modify_task(owner, id, |task| changes.apply(task, Utc::now()))
    }

    async fn delete(&self, owner: &str, id: &str) -> AppResult<bool> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok(tasks.len() != before)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Duplicate(
                "Username or email already registered".to_string(),
            ));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> AppResult<Option<User>> {
        self.modify_user(|u| u.id == id, |user| update.apply(user, Utc::now()))
    }

    async fn set_dates(
        &self,
        email: &str,
        date_of_birth: NaiveDate,
        date_of_joining: NaiveDate,
    ) -> AppResult<Option<User>> {
        self.modify_user(
            |u| u.email == email,
            |user| {
                user.date_of_birth = Some(date_of_birth);
                user.date_of_joining = Some(date_of_joining);
                user.updated_at = Utc::now();
            },
        )
    }
}
