use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, users};

/// Public representation of a user record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields a caller may change on an existing user. `None` leaves the
/// current value untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// True if any user already holds this username, excluding `exclude_id`
    /// when given (so an update does not collide with its own record).
    pub async fn username_taken(&self, username: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.conn)
            .await
            .context("Failed to check username uniqueness")?;

        Ok(existing.is_some())
    }

    /// See [`Self::username_taken`].
    pub async fn email_taken(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = Users::find().filter(users::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(users::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.conn)
            .await
            .context("Failed to check email uniqueness")?;

        Ok(existing.is_some())
    }

    /// Inserts a new user. Both timestamps are set to the current time.
    /// Races with a concurrent create of the same username/email are
    /// resolved by the unique constraints, surfacing as a database error.
    pub async fn create(&self, username: &str, email: &str) -> Result<User> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        info!("Created user: {}", model.username);
        Ok(User::from(model))
    }

    /// Applies all requested changes in a single statement and advances
    /// `updated_at` once. An empty change set is a no-op that leaves
    /// `updated_at` untouched. Returns `None` if the record no longer
    /// exists.
    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<Option<User>> {
        let Some(model) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        if changes.is_empty() {
            return Ok(Some(User::from(model)));
        }

        let mut active: users::ActiveModel = model.into();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        info!("Updated user: {}", model.username);
        Ok(Some(User::from(model)))
    }

    /// Permanently removes the record. Returns false if it did not exist.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let Some(model) = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for deletion")?
        else {
            return Ok(false);
        };

        let username = model.username.clone();
        model
            .delete(&self.conn)
            .await
            .context("Failed to delete user")?;

        info!("Deleted user: {}", username);
        Ok(true)
    }
}
