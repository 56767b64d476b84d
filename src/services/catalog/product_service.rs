use crate::{
    db::DatabaseAccess,
    entities::{product, Product, ProductModel},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const PRODUCT_NOT_FOUND: &str = "Produto não encontrado";

/// Product service for the admin catalog
#[derive(Clone)]
pub struct ProductService {
    db: DatabaseAccess,
}

impl ProductService {
    pub fn new(db: DatabaseAccess) -> Self {
        Self { db }
    }

    /// All products in primary-key order
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Product::find()
            .order_by_asc(product::Column::Id)
            .all(self.db.get_pool())
            .await
            .map_err(Into::into)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: i32) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id)
            .one(self.db.get_pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let product = product::ActiveModel {
                        name: Set(input.name),
                        description: Set(input.description),
                        price: Set(input.price),
                        category: Set(input.category),
                        image_url: Set(input.image_url),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    Ok(product.insert(txn).await?)
                })
            })
            .await?;

        info!("Created product: {}", product.id);
        Ok(product)
    }

    /// Apply the fields present in `input`; `updated_at` is refreshed even
    /// when nothing else changes.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: i32,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let product = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Product::find_by_id(product_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

                    let mut active: product::ActiveModel = existing.into();

                    if let Some(name) = input.name {
                        active.name = Set(name);
                    }
                    if let Some(description) = input.description {
                        active.description = Set(description);
                    }
                    if let Some(price) = input.price {
                        active.price = Set(price);
                    }
                    if let Some(category) = input.category {
                        active.category = Set(category);
                    }
                    if let Some(image_url) = input.image_url {
                        active.image_url = Set(image_url);
                    }

                    active.updated_at = Set(Utc::now());

                    Ok(active.update(txn).await?)
                })
            })
            .await?;

        info!("Updated product: {}", product_id);
        Ok(product)
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: i32) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Product::find_by_id(product_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(PRODUCT_NOT_FOUND.to_string()))?;

                    let active: product::ActiveModel = existing.into();
                    active.delete(txn).await?;
                    Ok(())
                })
            })
            .await?;

        info!("Deleted product: {}", product_id);
        Ok(())
    }
}

/// Input for creating a product, already validated and defaulted
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
}

impl CreateProductInput {
    /// Input with the optional fields at their defaults
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category: product::DEFAULT_CATEGORY.to_string(),
            image_url: String::new(),
        }
    }
}

/// Input for updating a product; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}
