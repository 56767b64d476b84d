/// Catalog services module - product and category business logic
pub mod category_service;
pub mod product_service;

// Re-export services for convenience
pub use category_service::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
pub use product_service::{CreateProductInput, ProductService, UpdateProductInput};
