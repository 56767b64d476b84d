use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resin Admin API",
        version = "1.0.0",
        description = r#"
# Resin Admin API

Catalog administration for the resin crafts storefront: products and the
categories they are grouped under.

## Error Handling

Failing calls answer with the raw error message:

```json
{
  "error": "Categoria já existe",
  "request_id": "5b0e3c1e-1f0a-4c8b-9a39-8f1f3b1f3c2d",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Every response carries an `x-request-id` header.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "Products", description = "Product management endpoints"),
        (name = "Categories", description = "Category management endpoints"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Categories
        crate::handlers::categories::list_categories,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            // Product types
            crate::handlers::products::ProductResponse,
            crate::handlers::products::CreateProductRequest,
            crate::handlers::products::UpdateProductRequest,

            // Category types
            crate::handlers::categories::CategoryResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,

            // Health types
            crate::handlers::health::HealthResponse,
            crate::handlers::health::HealthStatus,
            crate::handlers::health::ComponentStatus,

            // Common types
            crate::errors::ErrorResponse,
            crate::errors::MessageResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
