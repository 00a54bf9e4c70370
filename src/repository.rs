use crate::models::{CallerProfile, ImageRef, ProductImages, ProfileRow, VendorSummary};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// RepositoryError
///
/// Failure modes of the persistence layer. The gateway degrades on every variant,
/// handlers map them to status codes.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Repository Trait
///
/// The persistence contract consumed by the gateway and the image normalizer.
/// The gateway only ever reads through it; the only write is the owner-scoped
/// image rewrite.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Profiles ---
    /// Reads the authorization profile of an identity. At most one exists.
    async fn get_profile(&self, id: Uuid) -> Result<CallerProfile, RepositoryError>;
    /// Admin listing of every profile with the vendor role.
    async fn list_vendors(&self) -> Result<Vec<VendorSummary>, RepositoryError>;

    // --- Product images (owner scoped) ---
    /// Lists the image columns of every product owned by `owner_id`.
    async fn list_owned_products(&self, owner_id: Uuid)
    -> Result<Vec<ProductImages>, RepositoryError>;
    /// Replaces the images of a product. Matches on both `id` and `owner_id`;
    /// returns false when no row owned by `owner_id` was touched.
    async fn update_product_images(
        &self,
        id: Uuid,
        owner_id: Uuid,
        images: &[ImageRef],
    ) -> Result<bool, RepositoryError>;
}

/// Lists a vendor's products in a stable order. Only touches the columns of
/// `products(id, vendor_id, name, images, updated_at)`.
const LIST_OWNED_PRODUCTS_SQL: &str = r#"SELECT id, vendor_id, images, updated_at
   FROM products
   WHERE vendor_id = $1
   ORDER BY id ASC"#;

const UPDATE_PRODUCT_IMAGES_SQL: &str = r#"UPDATE products
   SET images = $1, updated_at = NOW()
   WHERE id = $2 AND vendor_id = $3"#;

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_profile(&self, id: Uuid) -> Result<CallerProfile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"SELECT id, email, role, status FROM profiles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CallerProfile::from).ok_or(RepositoryError::NotFound)
    }

    async fn list_vendors(&self) -> Result<Vec<VendorSummary>, RepositoryError> {
        let vendors = sqlx::query_as::<_, VendorSummary>(
            r#"SELECT id, email, status FROM profiles WHERE role = 'vendor' ORDER BY email ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(vendors)
    }

    /// list_owned_products
    ///
    /// **Security**: strictly filtered by `vendor_id`, the normalizer never sees
    /// another tenant's rows.
    async fn list_owned_products(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ProductImages>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductImages>(LIST_OWNED_PRODUCTS_SQL)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    /// update_product_images
    ///
    /// Owner-Only: the `vendor_id = $3` predicate makes a foreign id a no-op.
    async fn update_product_images(
        &self,
        id: Uuid,
        owner_id: Uuid,
        images: &[ImageRef],
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(UPDATE_PRODUCT_IMAGES_SQL)
            .bind(sqlx::types::Json(images))
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
