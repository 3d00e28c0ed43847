use anyhow::Result;
use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Collection,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    config::DevAdminConfig,
    models::user::{AdminRole, AdminUser},
    services::database::Database,
};

/// Collection name used by the existing admin tooling
pub const ADMIN_USERS_COLLECTION: &str = "adminusers";

/// Credential store for admin users
#[async_trait]
pub trait AdminUserStore: Send + Sync {
    /// Look up an active user by exact username
    async fn find_active_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<AdminUser>>;

    /// Persist the time of a successful login
    async fn record_login(&self, id: &ObjectId, at: DateTime) -> Result<()>;
}

/// MongoDB-backed store
pub struct MongoAdminUserStore {
    collection: Collection<AdminUser>,
}

impl MongoAdminUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.database.collection(ADMIN_USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl AdminUserStore for MongoAdminUserStore {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let filter = doc! { "username": username, "isActive": true };
        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<AdminUser>> {
        Ok(self.collection.find_one(doc! { "_id": *id }, None).await?)
    }

    async fn record_login(&self, id: &ObjectId, at: DateTime) -> Result<()> {
        self.collection
            .update_one(doc! { "_id": *id }, doc! { "$set": { "lastLogin": at } }, None)
            .await?;
        Ok(())
    }
}

/// Process-local store used in dev mode and tests
#[derive(Default)]
pub struct InMemoryAdminUserStore {
    users: RwLock<HashMap<ObjectId, AdminUser>>,
}

impl InMemoryAdminUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding a single active account built from the dev settings
    pub async fn with_dev_admin(dev: &DevAdminConfig) -> Result<Self> {
        let role: AdminRole = dev.role.parse()?;
        let password = dev.password.clone();
        let hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST)).await??;

        let store = Self::new();
        store
            .insert(
                AdminUser::new(dev.username.clone(), hash, role)
                    .with_profile("admin@localhost", "Dev", "Admin"),
            )
            .await;

        tracing::info!("Seeded in-memory admin store with dev account: {}", dev.username);
        Ok(store)
    }

    /// Insert or replace a user, assigning an id if it has none
    pub async fn insert(&self, mut user: AdminUser) -> ObjectId {
        let id = *user.id.get_or_insert_with(ObjectId::new);
        self.users.write().await.insert(id, user);
        id
    }

    pub async fn set_active(&self, id: &ObjectId, active: bool) -> bool {
        match self.users.write().await.get_mut(id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AdminUserStore for InMemoryAdminUserStore {
    async fn find_active_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.username == username && user.is_active)
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<AdminUser>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn record_login(&self, id: &ObjectId, at: DateTime) -> Result<()> {
        if let Some(user) = self.users.write().await.get_mut(id) {
            user.last_login = Some(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inactive_users_are_not_found_by_username() {
        let store = InMemoryAdminUserStore::new();
        let id = store
            .insert(AdminUser::new("clerk".into(), "hash".into(), AdminRole::BranchAdmin))
            .await;

        assert!(store.find_active_by_username("clerk").await.unwrap().is_some());

        assert!(store.set_active(&id, false).await);
        assert!(store.find_active_by_username("clerk").await.unwrap().is_none());
        // lookup by id still returns the record so callers can check is_active
        assert!(store.find_by_id(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn record_login_sets_timestamp() {
        let store = InMemoryAdminUserStore::new();
        let id = store
            .insert(AdminUser::new("admin".into(), "hash".into(), AdminRole::Admin))
            .await;

        let at = DateTime::now();
        store.record_login(&id, at).await.unwrap();

        let user = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(user.last_login, Some(at));
    }

    #[tokio::test]
    async fn dev_admin_is_seeded_with_hashed_password() {
        let dev = DevAdminConfig {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: "superadmin".to_string(),
        };
        let store = InMemoryAdminUserStore::with_dev_admin(&dev).await.unwrap();

        let user = store.find_active_by_username("admin").await.unwrap().unwrap();
        assert_eq!(user.role, AdminRole::SuperAdmin);
        assert_ne!(user.password_hash, "admin123");
        assert!(bcrypt::verify("admin123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn dev_admin_with_unknown_role_fails() {
        let dev = DevAdminConfig {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: "janitor".to_string(),
        };
        assert!(InMemoryAdminUserStore::with_dev_admin(&dev).await.is_err());
    }
}
