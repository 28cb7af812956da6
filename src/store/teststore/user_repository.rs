use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::User;
use crate::store::{prepare_for_create, StoreError, UserRepository};

/// Users keyed by id. Ids are `len + 1`, which holds only because nothing is
/// ever deleted.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<i32, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &mut User) -> Result<(), StoreError> {
        prepare_for_create(user)?;

        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        user.id = users.len() as i32 + 1;
        let mut stored = user.clone();
        stored.sanitize();
        users.insert(stored.id, stored);

        debug!(user_id = user.id, "user stored in memory");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::RecordNotFound)
    }

    async fn find_by_id(&self, id: i32) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::RecordNotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::store::teststore::TestStore;
    use crate::store::Store;

    #[tokio::test]
    async fn create_assigns_id() {
        let s = TestStore::new();
        let mut u = User::fixture();
        u.id = 512;
        s.user().create(&mut u).await.expect("create");
        assert_eq!(u.id, 1);
        assert!(!u.encrypted_password.is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_user() {
        let s = TestStore::new();
        let mut u = User::new("invalid", "");
        let err = s.user().create(&mut u).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(u.id, 0);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let s = TestStore::new();
        s.user().create(&mut User::fixture()).await.unwrap();
        let err = s.user().create(&mut User::fixture()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn find_by_email() {
        let s = TestStore::new();
        let mut u1 = User::fixture();
        let err = s.user().find_by_email(&u1.email).await.unwrap_err();
        assert!(matches!(err, StoreError::RecordNotFound));
        assert_eq!(err.to_string(), "record not found");

        s.user().create(&mut u1).await.unwrap();
        let u2 = s.user().find_by_email(&u1.email).await.expect("found");
        assert_eq!(u2.id, u1.id);
        assert!(u2.password.is_empty());
        assert!(u2.compare_passwords("password"));
    }

    #[tokio::test]
    async fn find_by_id() {
        let s = TestStore::new();
        let mut u1 = User::fixture();
        assert!(matches!(
            s.user().find_by_id(1).await,
            Err(StoreError::RecordNotFound)
        ));

        s.user().create(&mut u1).await.unwrap();
        let u2 = s.user().find_by_id(u1.id).await.expect("found");
        assert_eq!(u2.email, u1.email);
    }

    #[tokio::test]
    async fn repository_is_reused() {
        let s = TestStore::new();
        s.user().create(&mut User::fixture()).await.unwrap();
        assert!(s.user().find_by_email("user@example.org").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_ids() {
        let s = Arc::new(TestStore::new());
        let mut tasks = Vec::new();
        for i in 0..16 {
            let s = Arc::clone(&s);
            tasks.push(tokio::spawn(async move {
                let mut u = User::new(format!("user{i}@example.org"), "password");
                s.user().create(&mut u).await.map(|_| u.id)
            }));
        }

        let mut ids = HashSet::new();
        for t in tasks {
            let id = t.await.unwrap().unwrap();
            assert!(ids.insert(id), "id {id} assigned twice");
        }
        assert_eq!(ids, (1..=16).collect::<HashSet<i32>>());
    }
}
