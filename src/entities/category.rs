use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Color token used when a category is created without one.
pub const DEFAULT_COLOR: &str = "bg-gradient-to-br from-gray-400 to-gray-600";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique across categories; the UNIQUE index closes the race left open
    /// by the service-level pre-check.
    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
