//! Export handler: runs the converter and returns the produced file.

use crate::api::AppState;
use crate::error::Error;
use crate::export::ExportArtifact;
use crate::types::DownloadRepoRequest;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::Path;

/// POST /download-repo - Export a repository into a single text file
///
/// The response body is the file produced by the converter, sent as an
/// attachment under the filename the converter reported.
#[utoipa::path(
    post,
    path = "/download-repo",
    tag = "export",
    request_body = DownloadRepoRequest,
    responses(
        (status = 200, description = "Exported repository content", content_type = "application/octet-stream"),
        (status = 500, description = "Conversion failed or the file could not be sent", body = crate::error::ApiError)
    )
)]
pub async fn download_repo(
    State(state): State<AppState>,
    Json(request): Json<DownloadRepoRequest>,
) -> Result<Response, Error> {
    let artifact = state.exporter.export(&request.repo_url).await?;
    Ok(attachment(artifact))
}

fn attachment(artifact: ExportArtifact) -> Response {
    let display_name = Path::new(&artifact.file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.file_name.clone());
    let safe_name: String = display_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&safe_name).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_name),
            ),
        ],
        artifact.contents,
    )
        .into_response()
}

fn content_type_for(name: &str) -> &'static str {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn text_files_are_plain_text() {
        assert_eq!(content_type_for("repo_content.txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("archive.zip"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn attachment_uses_base_name() {
        let response = attachment(ExportArtifact {
            file_name: "nested/my\"repo_content.txt".into(),
            path: PathBuf::from("/tmp/nested/my\"repo_content.txt"),
            contents: b"hi".to_vec(),
        });

        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"myrepo_content.txt\""
        );
    }
}
