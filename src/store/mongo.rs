// src/store/mongo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use futures_util::TryStreamExt;
use log::info;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::board::DateRange;
use crate::error::{AppError, AppResult};
use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{ProfileUpdate, User};
use crate::store::{TaskStore, UserStore};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn init(uri: &str, db_name: &str) -> AppResult<Self> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        let store = MongoStore {
            db: client.database(db_name),
        };
        store.ensure_indexes().await?;
        info!("Connected to MongoDB database {}", db_name);
        Ok(store)
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>("users")
    }

    fn tasks(&self) -> Collection<Task> {
        self.db.collection::<Task>("tasks")
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await?;
        self.tasks()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "userId": 1, "date": 1 })
                    .build(),
            )
            .await?;
        Ok(())
    }

    async fn find_tasks(&self, filter: Document) -> AppResult<Vec<Task>> {
        let cursor = self.tasks().find(filter).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn owned(owner: &str, id: &str) -> Document {
    doc! { "_id": id, "userId": owner }
}

/// Timestamps are stored in the same `Z`-suffixed RFC 3339 form serde writes
/// for `DateTime<Utc>`, so range filters can compare them as strings.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn now_string() -> String {
    timestamp(Utc::now())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn task_changes_doc(changes: &TaskChanges) -> Document {
    let mut set = doc! {};
    if let Some(title) = &changes.title {
        set.insert("title", title);
    }
    if let Some(description) = &changes.description {
        set.insert("description", description);
    }
    if let Some(status) = changes.status {
        set.insert("status", status.as_str());
    }
    if let Some(date) = changes.date {
        set.insert("date", date.to_string());
    }
    if let Some(priority) = changes.priority {
        set.insert("priority", priority.as_str());
    }
    if let Some(tags) = &changes.tags {
        set.insert("tags", tags.clone());
    }
    set.insert("updatedAt", now_string());
    set
}

#[async_trait]
impl TaskStore for MongoStore {
    async fn list_by_date(&self, owner: &str, date: NaiveDate) -> AppResult<Vec<Task>> {
        self.find_tasks(doc! { "userId": owner, "date": date.to_string() })
            .await
    }

    async fn list_range(&self, owner: &str, range: DateRange) -> AppResult<Vec<Task>> {
        // Calendar days are stored as YYYY-MM-DD, so string order is date order.
        self.find_tasks(doc! {
            "userId": owner,
            "date": { "$gte": range.start.to_string(), "$lte": range.end.to_string() },
        })
        .await
    }

    async fn list_all(&self, owner: &str) -> AppResult<Vec<Task>> {
        self.find_tasks(doc! { "userId": owner }).await
    }

    async fn list_created_since(&self, owner: &str, since: DateTime<Utc>) -> AppResult<Vec<Task>> {
        self.find_tasks(doc! { "userId": owner, "createdAt": { "$gte": timestamp(since) } })
            .await
    }

    async fn insert(&self, owner: &str, task: NewTask) -> AppResult<Task> {
        let task = Task::new(owner, task);
        self.tasks().insert_one(&task).await?;
        Ok(task)
    }

    async fn set_status(&self, owner: &str, id: &str, status: TaskStatus) -> AppResult<Option<Task>> {
        let update = doc! { "$set": { "status": status.as_str(), "updatedAt": now_string() } };
        Ok(self
            .tasks()
            .find_one_and_update(owned(owner, id), update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn update(&self, owner: &str, id: &str, changes: &TaskChanges) -> AppResult<Option<Task>> {
        let update = doc! { "$set": task_changes_doc(changes) };
        Ok(self
            .tasks()
            .find_one_and_update(owned(owner, id), update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, owner: &str, id: &str) -> AppResult<bool> {
        let deleted = self.tasks().find_one_and_delete(owned(owner, id)).await?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn create(&self, user: User) -> AppResult<User> {
        let existing = self
            .users()
            .find_one(doc! { "$or": [ { "username": &user.username }, { "email": &user.email } ] })
            .await?;
        if existing.is_some() {
            return Err(AppError::Duplicate(
                "Username or email already registered".to_string(),
            ));
        }

        match self.users().insert_one(&user).await {
            Ok(_) => Ok(user),
            // Lost a race with a concurrent registration.
            Err(e) if is_duplicate_key(&e) => Err(AppError::Duplicate(
                "Username or email already registered".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let mut set = doc! {};
        for (field, value) in update.fields() {
            set.insert(field, value);
        }
        set.insert("updatedAt", now_string());

        Ok(self
            .users()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn set_dates(
        &self,
        email: &str,
        date_of_birth: NaiveDate,
        date_of_joining: NaiveDate,
    ) -> AppResult<Option<User>> {
        let update = doc! {
            "$set": {
                "dateOfBirth": date_of_birth.to_string(),
                "dateOfJoining": date_of_joining.to_string(),
                "updatedAt": now_string(),
            }
        };
        Ok(self
            .users()
            .find_one_and_update(doc! { "email": email }, update)
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Priority;

    #[test]
    fn changes_doc_only_sets_present_fields() {
        let changes = TaskChanges {
            status: Some(TaskStatus::InProgress),
            priority: Some(Priority::High),
            tags: Some(vec!["ops".to_string()]),
            ..Default::default()
        };
        let set = task_changes_doc(&changes);
        assert_eq!(set.get_str("status").unwrap(), "inProgress");
        assert_eq!(set.get_str("priority").unwrap(), "high");
        assert!(set.get_array("tags").is_ok());
        assert!(set.get("title").is_none());
        assert!(set.get("date").is_none());
        assert!(set.contains_key("updatedAt"));
    }

    #[test]
    fn timestamps_match_serde_form() {
        let at = DateTime::parse_from_rfc3339("2024-05-20T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let stored = serde_json::to_value(at).unwrap();
        assert_eq!(stored, timestamp(at));
        assert_eq!(timestamp(at), "2024-05-20T08:30:00Z");
    }

    #[test]
    fn owner_filter_includes_both_keys() {
        let filter = owned("alice", "t1");
        assert_eq!(filter.get_str("_id").unwrap(), "t1");
        assert_eq!(filter.get_str("userId").unwrap(), "alice");
    }
}
