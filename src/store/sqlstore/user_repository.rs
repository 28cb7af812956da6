use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::User;
use crate::store::{prepare_for_create, StoreError, UserRepository};

pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_db_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::RecordNotFound,
        sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::DuplicateEmail,
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &mut User) -> Result<(), StoreError> {
        prepare_for_create(user)?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (email, encrypted_password)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.encrypted_password)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_error)?;

        user.id = id;
        debug!(user_id = id, "user inserted");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, encrypted_password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_error)
    }

    async fn find_by_id(&self, id: i32) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, encrypted_password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_error)
    }
}
