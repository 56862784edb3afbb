//! OpenAPI documentation for the export backend

use utoipa::OpenApi;

/// OpenAPI documentation, served at `/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "hubfetch export API",
        version = "0.1.0",
        description = "Exports a GitHub repository into a single text file",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development server")
    ),
    paths(
        crate::api::routes::download_repo,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::DownloadRepoRequest,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "export", description = "Repository export"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
