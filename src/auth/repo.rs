use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

pub use crate::auth::repo_types::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already taken")]
    UniqueViolation,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
        }
        StoreError::Backend(e.into())
    }
}

/// Persistence for user records. Implementations must reject an insert whose
/// username or email is already present with `StoreError::UniqueViolation`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, username, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = $2
            LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, username, password_hash, created_at
            "#,
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }
}

/// Store backed by a vector, with the same uniqueness rules as the table.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryUserStore {
    users: tokio::sync::RwLock<Vec<User>>,
}

#[cfg(test)]
impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[cfg(test)]
#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::UniqueViolation);
        }
        let record = User {
            id: uuid::Uuid::new_v4(),
            full_name: user.full_name,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: time::OffsetDateTime::now_utc(),
        };
        users.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            full_name: "Test User".into(),
            email: email.into(),
            username: username.into(),
            password_hash: "$argon2id$placeholder".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryUserStore::new();
        let created = store.insert(new_user("jane", "jane@x.com")).await.unwrap();

        let by_name = store.find_by_username("jane").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);

        let by_email = store
            .find_by_username_or_email("nobody", "jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(store.find_by_username("john").await.unwrap().is_none());
        assert!(store
            .find_by_username_or_email("john", "john@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_username() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("jane", "jane@x.com")).await.unwrap();
        let err = store.insert(new_user("jane", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("jane", "jane@x.com")).await.unwrap();
        let err = store.insert(new_user("janet", "jane@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            username: "jane".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("Jane Doe"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$argon2id$secret"));
    }
}
