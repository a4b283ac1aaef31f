//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::analytics::{blog_views, performance, top, types};
use crate::api::routes::health;
use crate::data::types::{CompareUnit, ObjectType, RangeUnit, TopKind};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blogscope API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Blog analytics reports"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "analytics", description = "Blog views, top entries and performance over time")
    ),
    paths(
        health::health,
        blog_views::get_blog_views,
        top::get_top,
        performance::get_performance,
    ),
    components(schemas(
        health::HealthResponse,
        ObjectType,
        TopKind,
        RangeUnit,
        CompareUnit,
        types::ReportRowDto,
        types::BlogViewsResponse,
        types::TopResponse,
        types::PerformanceRowDto,
        types::PerformanceResponse,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Blogscope API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "/api/openapi.json", dom_id: '#swagger-ui' });
        };
    </script>
</body>
</html>
"#;
