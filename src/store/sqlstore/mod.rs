//! Postgres-backed store.

use std::sync::OnceLock;

use sqlx::PgPool;

use super::{Store, UserRepository};

mod user_repository;

use user_repository::PgUserRepository;

pub struct SqlStore {
    db: PgPool,
    user_repository: OnceLock<PgUserRepository>,
}

impl SqlStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            user_repository: OnceLock::new(),
        }
    }
}

impl Store for SqlStore {
    fn user(&self) -> &dyn UserRepository {
        self.user_repository
            .get_or_init(|| PgUserRepository::new(self.db.clone()))
    }
}
