use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category label assigned when a product is created without one.
pub const DEFAULT_CATEGORY: &str = "Geral";

/// Product entity
///
/// `category` is a free-text label, not a foreign key: renaming or deleting a
/// category leaves existing products untouched.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub price: f64,

    pub category: String,

    #[sea_orm(column_type = "Text")]
    pub image_url: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
