use crate::{
    entities::{category::DEFAULT_COLOR, CategoryModel},
    errors::{ErrorResponse, MessageResponse, ServiceError},
    handlers::common::{
        created_response, non_empty, parse_create_body, parse_update_body, success_response,
    },
    services::catalog::{CreateCategoryInput, UpdateCategoryInput},
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const NAME_REQUIRED: &str = "Nome é obrigatório";
const MISSING_DATA: &str = "Dados não fornecidos";
const CATEGORY_DELETED: &str = "Categoria deletada com sucesso";

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "Joias")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "bg-gradient-to-br from-pink-400 to-purple-500")]
    pub color: Option<String>,
}

impl CreateCategoryRequest {
    fn into_input(self) -> Result<CreateCategoryInput, ServiceError> {
        let name = non_empty(self.name)
            .ok_or_else(|| ServiceError::ValidationError(NAME_REQUIRED.to_string()))?;

        Ok(CreateCategoryInput {
            name,
            description: self.description.unwrap_or_default(),
            color: self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        })
    }
}

/// Partial category update; absent and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl UpdateCategoryRequest {
    fn into_input(self) -> Result<UpdateCategoryInput, ServiceError> {
        if matches!(self.name.as_deref(), Some("")) {
            return Err(ServiceError::ValidationError(NAME_REQUIRED.to_string()));
        }

        Ok(UpdateCategoryInput {
            name: self.name,
            description: self.description,
            color: self.color,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub color: String,
}

impl From<CategoryModel> for CategoryResponse {
    fn from(model: CategoryModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            color: model.color,
        }
    }
}

/// List all categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryResponse]),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories: Vec<CategoryResponse> = state
        .categories
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(success_response(categories))
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Name missing or already taken", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let input = parse_create_body::<CreateCategoryRequest>(&body, NAME_REQUIRED)?.into_input()?;

    let category = state.categories.create_category(input).await?;
    Ok(created_response(CategoryResponse::from(category)))
}

/// Update a category; only the fields present in the body change
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Malformed body or name already taken", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    // A missing row is reported before anything in the body is looked at.
    state.categories.get_category(id).await?;

    let input = parse_update_body::<UpdateCategoryRequest>(&body, MISSING_DATA)?.into_input()?;

    let category = state.categories.update_category(id, input).await?;
    Ok(success_response(CategoryResponse::from(category)))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.categories.delete_category(id).await?;
    Ok(success_response(MessageResponse::new(CATEGORY_DELETED)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn create_requires_a_name() {
        for body in [r#"{}"#, r#"{"name":""}"#, r#"{"name":null,"color":"x"}"#] {
            let req: CreateCategoryRequest = serde_json::from_str(body).unwrap();
            assert_matches!(
                req.into_input(),
                Err(ServiceError::ValidationError(ref m)) if m == NAME_REQUIRED
            );
        }
    }

    #[test]
    fn create_defaults_description_and_color() {
        let req: CreateCategoryRequest = serde_json::from_str(r#"{"name":"Test"}"#).unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.description, "");
        assert_eq!(input.color, DEFAULT_COLOR);
    }

    #[test]
    fn update_rejects_blank_name() {
        let req: UpdateCategoryRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_matches!(req.into_input(), Err(ServiceError::ValidationError(_)));

        let req: UpdateCategoryRequest = serde_json::from_str(r#"{"color":"x"}"#).unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.name, None);
        assert_eq!(input.color.as_deref(), Some("x"));
    }
}
