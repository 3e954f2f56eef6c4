use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct ReviewInputDoc {
    pub rating: f64,
    pub comment: Option<String>,
}

#[derive(ToSchema)]
pub struct ReviewDoc {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: f64,
    pub comment: String,
}

#[derive(ToSchema)]
pub struct BookDoc {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub rating: f64,
    pub reviews: Vec<ReviewDoc>,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::books::list,
        crate::routes::books::get_by_isbn,
        crate::routes::books::search,
        crate::routes::books::by_min_rating,
        crate::routes::reviews::list,
        crate::routes::reviews::add,
        crate::routes::reviews::update,
        crate::routes::reviews::remove,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ReviewInputDoc,
            ReviewDoc,
            BookDoc,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "catalog", description = "Public book catalog reads"),
        (name = "reviews", description = "Review listing and mutations"),
        (name = "auth", description = "Registration and login"),
        (name = "ops", description = "Operational endpoints")
    )
)]
pub struct ApiDoc;
