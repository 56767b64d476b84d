use crate::{
    db::DatabaseAccess,
    entities::{category, Category, CategoryModel},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TryIntoModel,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const CATEGORY_NOT_FOUND: &str = "Categoria não encontrada";
pub const CATEGORY_EXISTS: &str = "Categoria já existe";
pub const CATEGORY_NAME_TAKEN: &str = "Nome da categoria já existe";

/// Category service for the admin catalog
#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseAccess,
}

impl CategoryService {
    pub fn new(db: DatabaseAccess) -> Self {
        Self { db }
    }

    /// All categories in primary-key order
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        Category::find()
            .order_by_asc(category::Column::Id)
            .all(self.db.get_pool())
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: i32) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(category_id)
            .one(self.db.get_pool())
            .await?
            .ok_or_else(|| ServiceError::NotFound(CATEGORY_NOT_FOUND.to_string()))
    }

    /// Create a category. Duplicate names are rejected by the pre-check and,
    /// under a race, by the unique index.
    #[instrument(skip(self))]
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let category = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    ensure_unique_name(txn, &input.name, None, CATEGORY_EXISTS).await?;

                    let category = category::ActiveModel {
                        name: Set(input.name),
                        description: Set(input.description),
                        color: Set(input.color),
                        ..Default::default()
                    };
                    category
                        .insert(txn)
                        .await
                        .map_err(|e| ServiceError::from_unique_violation(e, CATEGORY_EXISTS))
                })
            })
            .await?;

        info!("Created category: {}", category.id);
        Ok(category)
    }

    /// Apply the fields present in `input`.
    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        category_id: i32,
        input: UpdateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let category = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Category::find_by_id(category_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(CATEGORY_NOT_FOUND.to_string()))?;

                    if let Some(name) = input.name.as_deref() {
                        ensure_unique_name(txn, name, Some(category_id), CATEGORY_NAME_TAKEN)
                            .await?;
                    }

                    let mut active: category::ActiveModel = existing.into();

                    if let Some(name) = input.name {
                        active.name = Set(name);
                    }
                    if let Some(description) = input.description {
                        active.description = Set(description);
                    }
                    if let Some(color) = input.color {
                        active.color = Set(color);
                    }

                    if !active.is_changed() {
                        // Nothing to write; an UPDATE with no columns is an error.
                        return Ok(active.try_into_model()?);
                    }

                    active
                        .update(txn)
                        .await
                        .map_err(|e| ServiceError::from_unique_violation(e, CATEGORY_NAME_TAKEN))
                })
            })
            .await?;

        info!("Updated category: {}", category_id);
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: i32) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = Category::find_by_id(category_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(CATEGORY_NOT_FOUND.to_string()))?;

                    let active: category::ActiveModel = existing.into();
                    active.delete(txn).await?;
                    Ok(())
                })
            })
            .await?;

        info!("Deleted category: {}", category_id);
        Ok(())
    }
}

/// Rejects `name` if another category (other than `exclude_id`) already uses it.
async fn ensure_unique_name<C>(
    conn: &C,
    name: &str,
    exclude_id: Option<i32>,
    conflict_message: &str,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let mut query = Category::find().filter(category::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(category::Column::Id.ne(id));
    }

    if query.one(conn).await?.is_some() {
        return Err(ServiceError::Conflict(conflict_message.to_string()));
    }

    Ok(())
}

/// Input for creating a category, already validated and defaulted
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl CreateCategoryInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            color: category::DEFAULT_COLOR.to_string(),
        }
    }
}

/// Input for updating a category; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_db;
    use assert_matches::assert_matches;

    async fn service() -> CategoryService {
        CategoryService::new(memory_db().await)
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let svc = service().await;
        let created = svc
            .create_category(CreateCategoryInput::new("Test"))
            .await
            .unwrap();

        assert!(created.id > 0);
        assert_eq!(created.description, "");
        assert_eq!(created.color, category::DEFAULT_COLOR);
        assert_eq!(svc.get_category(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_and_not_persisted() {
        let svc = service().await;
        svc.create_category(CreateCategoryInput::new("Test"))
            .await
            .unwrap();

        let err = svc
            .create_category(CreateCategoryInput::new("Test"))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(ref msg) if msg == CATEGORY_EXISTS);

        assert_eq!(svc.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unique_index_violation_maps_to_conflict() {
        let db = memory_db().await;
        let row = || category::ActiveModel {
            name: Set("Joias".to_string()),
            description: Set(String::new()),
            color: Set(category::DEFAULT_COLOR.to_string()),
            ..Default::default()
        };

        // Straight to the table, skipping the name pre-check.
        row().insert(db.get_pool()).await.unwrap();
        let db_err = row().insert(db.get_pool()).await.unwrap_err();

        let err = ServiceError::from_unique_violation(db_err, CATEGORY_EXISTS);
        assert_matches!(err, ServiceError::Conflict(ref msg) if msg == CATEGORY_EXISTS);
        assert_eq!(Category::find().all(db.get_pool()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_to_existing_name_is_rejected() {
        let svc = service().await;
        svc.create_category(CreateCategoryInput::new("Joias"))
            .await
            .unwrap();
        let other = svc
            .create_category(CreateCategoryInput::new("Chaveiros"))
            .await
            .unwrap();

        let err = svc
            .update_category(
                other.id,
                UpdateCategoryInput {
                    name: Some("Joias".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::Conflict(ref msg) if msg == CATEGORY_NAME_TAKEN);
    }

    #[tokio::test]
    async fn keeping_own_name_is_allowed() {
        let svc = service().await;
        let created = svc
            .create_category(CreateCategoryInput::new("Joias"))
            .await
            .unwrap();

        let updated = svc
            .update_category(
                created.id,
                UpdateCategoryInput {
                    name: Some("Joias".to_string()),
                    color: Some("bg-red-500".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Joias");
        assert_eq!(updated.color, "bg-red-500");
    }

    #[tokio::test]
    async fn empty_update_returns_unchanged_row() {
        let svc = service().await;
        let created = svc
            .create_category(CreateCategoryInput::new("Joias"))
            .await
            .unwrap();

        let updated = svc
            .update_category(created.id, UpdateCategoryInput::default())
            .await
            .unwrap();
        assert_eq!(updated, created);
    }

    #[tokio::test]
    async fn missing_categories_are_not_found() {
        let svc = service().await;

        assert_matches!(svc.get_category(404).await, Err(ServiceError::NotFound(_)));
        assert_matches!(
            svc.update_category(404, UpdateCategoryInput::default()).await,
            Err(ServiceError::NotFound(_))
        );
        assert_matches!(svc.delete_category(404).await, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let svc = service().await;
        let created = svc
            .create_category(CreateCategoryInput::new("Temp"))
            .await
            .unwrap();

        svc.delete_category(created.id).await.unwrap();
        assert!(svc.list_categories().await.unwrap().is_empty());
    }
}
