use crate::{
    entities::{product::DEFAULT_CATEGORY, ProductModel},
    errors::{ErrorResponse, MessageResponse, ServiceError},
    handlers::common::{
        created_response, non_empty, parse_create_body, parse_update_body, success_response,
    },
    services::catalog::{CreateProductInput, UpdateProductInput},
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const REQUIRED_FIELDS: &str = "Nome e preço são obrigatórios";
const MISSING_DATA: &str = "Dados não fornecidos";
const PRODUCT_DELETED: &str = "Produto deletado com sucesso";

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// A price as sent by the admin form: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Zero and the empty string count as "not provided".
    fn is_truthy(&self) -> bool {
        match self {
            PriceInput::Number(n) => *n != 0.0,
            PriceInput::Text(s) => !s.is_empty(),
        }
    }

    /// Converts to a float; a non-numeric string is an internal fault, not a
    /// validation error.
    fn to_f64(&self) -> Result<f64, ServiceError> {
        let value = match self {
            PriceInput::Number(n) => Some(*n),
            PriceInput::Text(s) => s.trim().parse::<f64>().ok(),
        };

        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(ServiceError::InternalError(format!(
                "could not convert string to float: '{}'",
                self
            ))),
        }
    }
}

impl std::fmt::Display for PriceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceInput::Number(n) => write!(f, "{}", n),
            PriceInput::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "Ring")]
    pub name: Option<String>,
    #[schema(value_type = f64, example = 99.9)]
    pub price: Option<PriceInput>,
    pub description: Option<String>,
    #[schema(example = "Joias")]
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    fn into_input(self) -> Result<CreateProductInput, ServiceError> {
        let name = non_empty(self.name);
        let price = self.price.filter(PriceInput::is_truthy);

        let (Some(name), Some(price)) = (name, price) else {
            return Err(ServiceError::ValidationError(REQUIRED_FIELDS.to_string()));
        };

        Ok(CreateProductInput {
            name,
            price: price.to_f64()?,
            description: self.description.unwrap_or_default(),
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

/// Partial product update; absent and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<PriceInput>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateProductRequest {
    fn into_input(self) -> Result<UpdateProductInput, ServiceError> {
        Ok(UpdateProductInput {
            name: self.name,
            description: self.description,
            price: self.price.as_ref().map(PriceInput::to_f64).transpose()?,
            category: self.category,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductModel> for ProductResponse {
    fn from(model: ProductModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products: Vec<ProductResponse> = state
        .products
        .list_products()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    Ok(success_response(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.get_product(id).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Name or price missing", body = ErrorResponse),
        (status = 500, description = "Price not numeric or storage failure", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let input = parse_create_body::<CreateProductRequest>(&body, REQUIRED_FIELDS)?.into_input()?;

    let product = state.products.create_product(input).await?;
    Ok(created_response(ProductResponse::from(product)))
}

/// Update a product; only the fields present in the body change
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Price not numeric or storage failure", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    // A missing row is reported before anything in the body is looked at.
    state.products.get_product(id).await?;

    let input = parse_update_body::<UpdateProductRequest>(&body, MISSING_DATA)?.into_input()?;

    let product = state.products.update_product(id, input).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.products.delete_product(id).await?;
    Ok(success_response(MessageResponse::new(PRODUCT_DELETED)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(json: &str) -> CreateProductRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn price_accepts_numbers_and_numeric_strings() {
        let input = request(r#"{"name":"Ring","price":"12.50"}"#)
            .into_input()
            .unwrap();
        assert_eq!(input.price, 12.5);

        let input = request(r#"{"name":"Ring","price":" 7 "}"#)
            .into_input()
            .unwrap();
        assert_eq!(input.price, 7.0);

        let input = request(r#"{"name":"Ring","price":99.9}"#)
            .into_input()
            .unwrap();
        assert_eq!(input.price, 99.9);
    }

    #[test]
    fn non_numeric_price_is_an_internal_error() {
        let err = request(r#"{"name":"Ring","price":"abc"}"#)
            .into_input()
            .unwrap_err();
        assert_matches!(err, ServiceError::InternalError(ref m) if m.contains("'abc'"));

        let err = request(r#"{"name":"Ring","price":"nan"}"#)
            .into_input()
            .unwrap_err();
        assert_matches!(err, ServiceError::InternalError(_));
    }

    #[test]
    fn falsy_name_or_price_is_rejected() {
        for body in [
            r#"{"price":10}"#,
            r#"{"name":"","price":10}"#,
            r#"{"name":"Ring"}"#,
            r#"{"name":"Ring","price":0}"#,
            r#"{"name":"Ring","price":""}"#,
            r#"{"name":"Ring","price":null}"#,
        ] {
            let err = request(body).into_input().unwrap_err();
            assert_matches!(err, ServiceError::ValidationError(ref m) if m == REQUIRED_FIELDS);
        }
    }

    #[test]
    fn string_zero_price_is_truthy() {
        let input = request(r#"{"name":"Ring","price":"0"}"#)
            .into_input()
            .unwrap();
        assert_eq!(input.price, 0.0);
    }

    #[test]
    fn create_defaults_optional_fields() {
        let input = request(r#"{"name":"Ring","price":1}"#)
            .into_input()
            .unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.category, DEFAULT_CATEGORY);
        assert_eq!(input.image_url, "");
    }

    #[test]
    fn update_coerces_price_only_when_present() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"name":"X"}"#).unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.name.as_deref(), Some("X"));
        assert_eq!(input.price, None);

        let req: UpdateProductRequest = serde_json::from_str(r#"{"price":"3.25"}"#).unwrap();
        assert_eq!(req.into_input().unwrap().price, Some(3.25));

        let req: UpdateProductRequest = serde_json::from_str(r#"{"price":"x"}"#).unwrap();
        assert_matches!(req.into_input(), Err(ServiceError::InternalError(_)));
    }
}
