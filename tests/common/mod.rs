#![allow(dead_code)]

use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use uuid::Uuid;
use vendor_portal::{
    models::{AccountStatus, CallerProfile, ImageRef, ProductImages, Role, VendorSummary},
    repository::{Repository, RepositoryError},
};

pub const ADMIN_ID: Uuid = Uuid::from_u128(1);
pub const VENDOR_ID: Uuid = Uuid::from_u128(2);
pub const UNPROVISIONED_ID: Uuid = Uuid::from_u128(3);
pub const OTHER_VENDOR_ID: Uuid = Uuid::from_u128(4);

/// In-memory stand-in for the Postgres repository.
#[derive(Default)]
pub struct InMemoryRepository {
    pub profiles: HashMap<Uuid, CallerProfile>,
    pub products: Mutex<Vec<ProductImages>>,
    /// Every profile lookup fails as if the database were down.
    pub profiles_unreachable: bool,
    /// Product ids whose update fails.
    pub failing_updates: HashSet<Uuid>,
    pub profile_calls: AtomicUsize,
}

impl InMemoryRepository {
    pub fn with_standard_profiles() -> Self {
        let mut repo = Self::default();
        repo.insert_profile(ADMIN_ID, Role::Admin);
        repo.insert_profile(VENDOR_ID, Role::Vendor);
        repo
    }

    pub fn insert_profile(&mut self, id: Uuid, role: Role) {
        self.profiles.insert(
            id,
            CallerProfile {
                id,
                role,
                status: AccountStatus::Active,
            },
        );
    }

    pub fn add_product(&self, vendor_id: Uuid, images: serde_json::Value) -> Uuid {
        let id = Uuid::new_v4();
        self.products.lock().unwrap().push(ProductImages {
            id,
            vendor_id,
            images: Some(sqlx::types::Json(images)),
            updated_at: None,
        });
        id
    }

    pub fn images_of(&self, product_id: Uuid) -> serde_json::Value {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == product_id)
            .and_then(|p| p.images.as_ref().map(|json| json.0.clone()))
            .unwrap_or(serde_json::Value::Null)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_profile(&self, id: Uuid) -> Result<CallerProfile, RepositoryError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.profiles_unreachable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.profiles
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_vendors(&self) -> Result<Vec<VendorSummary>, RepositoryError> {
        Ok(self
            .profiles
            .values()
            .filter(|p| p.role == Role::Vendor)
            .map(|p| VendorSummary {
                id: p.id,
                email: None,
                status: Some(p.status.as_str().to_string()),
            })
            .collect())
    }

    async fn list_owned_products(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ProductImages>, RepositoryError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.vendor_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_product_images(
        &self,
        id: Uuid,
        owner_id: Uuid,
        images: &[ImageRef],
    ) -> Result<bool, RepositoryError> {
        if self.failing_updates.contains(&id) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut products = self.products.lock().unwrap();
        match products
            .iter_mut()
            .find(|p| p.id == id && p.vendor_id == owner_id)
        {
            Some(product) => {
                product.images = Some(sqlx::types::Json(serde_json::to_value(images).unwrap()));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
