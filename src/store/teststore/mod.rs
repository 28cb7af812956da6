//! In-memory store used by tests in place of Postgres.

use std::sync::OnceLock;

use super::{Store, UserRepository};

mod user_repository;

use user_repository::MemoryUserRepository;

#[derive(Default)]
pub struct TestStore {
    user_repository: OnceLock<MemoryUserRepository>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for TestStore {
    fn user(&self) -> &dyn UserRepository {
        self.user_repository.get_or_init(MemoryUserRepository::default)
    }
}
