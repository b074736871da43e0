//! Handlers for project photos (`/projects/{id}/images`).
//!
//! Files live on local disk under `{UPLOAD_DIR}/tenant_{t}/project_{p}/`;
//! the database stores the path relative to the upload root.

use std::path::PathBuf;

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use solarfy_core::error::CoreError;
use solarfy_core::project_image::{
    allowed_extension, content_type_for, probe, validate_caption, validate_size,
};
use solarfy_core::roles::Permission;
use solarfy_core::types::DbId;
use solarfy_db::models::project_image::CreateProjectImage;
use solarfy_db::repositories::ProjectImageRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::projects::find_project;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/images
///
/// Multipart form with a required `file` field and an optional `caption`.
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsEdit)?;
    find_project(&state, user.tenant_id, project_id).await?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut caption: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((file_name, data.to_vec()));
            }
            "caption" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let text = text.trim().to_string();
                if !text.is_empty() {
                    caption = Some(text);
                }
            }
            _ => {}
        }
    }

    let (original_name, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let ext = allowed_extension(&original_name)?;
    validate_size(data.len(), state.config.max_upload_bytes)?;
    if let Some(caption) = &caption {
        validate_caption(caption)?;
    }
    let info = probe(&data, &ext)?;
    state.ensure_writable(user.tenant_id).await?;

    let relative = relative_path(user.tenant_id, project_id, &ext);
    let absolute = state.config.upload_dir.join(&relative);
    if let Some(parent) = absolute.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;
    }
    tokio::fs::write(&absolute, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store image: {e}")))?;

    let input = CreateProjectImage {
        tenant_id: user.tenant_id,
        project_id,
        uploaded_by: user.user_id,
        file_path: relative.to_string_lossy().to_string(),
        original_name,
        content_type: content_type_for(&ext).to_string(),
        size_bytes: data.len() as i64,
        width: info.width as i32,
        height: info.height as i32,
        caption,
    };

    let image = match ProjectImageRepo::create(&state.pool, &input).await {
        Ok(image) => image,
        Err(e) => {
            // Do not leave an orphaned file behind.
            let _ = tokio::fs::remove_file(&absolute).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        image_id = image.id,
        project_id,
        size_bytes = image.size_bytes,
        width = image.width,
        height = image.height,
        "Project image uploaded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: image })))
}

/// GET /api/v1/projects/{id}/images
pub async fn list_images(
    State(state): State<AppState>,
    user: AuthUser,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsView)?;
    find_project(&state, user.tenant_id, project_id).await?;
    let images = ProjectImageRepo::list_for_project(&state.pool, user.tenant_id, project_id).await?;
    Ok(Json(DataResponse { data: images }))
}

/// GET /api/v1/projects/{id}/images/{image_id}/file
///
/// Streams the stored bytes with the recorded content type.
pub async fn download_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    user.require(Permission::ProjectsView)?;
    let image = ProjectImageRepo::find_by_id(&state.pool, user.tenant_id, project_id, image_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectImage",
            id: image_id,
        }))?;

    let path = state.config.upload_dir.join(&image.file_path);
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(image_id, path = %path.display(), error = %e, "Stored image missing");
        AppError::Core(CoreError::NotFound {
            entity: "ProjectImage",
            id: image_id,
        })
    })?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.content_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", safe_file_name(&image.original_name)),
            ),
        ],
        bytes,
    ))
}

/// DELETE /api/v1/projects/{id}/images/{image_id}
///
/// Removes the record and the file. Returns 204 No Content.
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path((project_id, image_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    user.require(Permission::ProjectsEdit)?;
    state.ensure_writable(user.tenant_id).await?;
    let image = ProjectImageRepo::delete(&state.pool, user.tenant_id, project_id, image_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectImage",
            id: image_id,
        }))?;

    let path = state.config.upload_dir.join(&image.file_path);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(image_id, path = %path.display(), error = %e, "Failed to remove image file");
    }
    tracing::info!(image_id, project_id, user_id = user.user_id, "Project image deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `tenant_{t}/project_{p}/{uuid}.{ext}`
fn relative_path(tenant_id: DbId, project_id: DbId, ext: &str) -> PathBuf {
    PathBuf::from(format!("tenant_{tenant_id}"))
        .join(format!("project_{project_id}"))
        .join(format!("{}.{ext}", uuid::Uuid::new_v4()))
}

/// Strip characters that would break a quoted header parameter.
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .filter(|c| !matches!(c, '"' | '\\' | '/'))
        .collect();
    if cleaned.is_empty() {
        "image".into()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_is_scoped_by_tenant_and_project() {
        let path = relative_path(3, 7, "png");
        let s = path.to_string_lossy();
        assert!(s.starts_with("tenant_3/project_7/"));
        assert!(s.ends_with(".png"));
    }

    #[test]
    fn file_names_are_made_header_safe() {
        assert_eq!(safe_file_name("roof \"front\".jpg"), "roof front.jpg");
        assert_eq!(safe_file_name("../../etc"), "....etc");
        assert_eq!(safe_file_name("\u{1F31E}"), "image");
    }
}
