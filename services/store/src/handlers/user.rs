use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
};
use serde::Deserialize;
use uuid::Uuid;

use cakeorder_auth_types::session::Session;

use crate::domain::types::ImageUpload;
use crate::error::StoreError;
use crate::handlers::dto::UserEnvelope;
use crate::state::AppState;
use crate::usecase::password::{ChangePasswordInput, ChangePasswordUseCase};
use crate::usecase::profile::{UpdateProfileInput, UpdateProfileUseCase};

fn invalid_upload(e: MultipartError) -> StoreError {
    StoreError::InvalidUpload(e.body_text())
}

// ── PUT /auth/user/update/{user_id} ───────────────────────────────────────────

/// Multipart fields: `name` (text) and `photo` (file). Both optional.
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UserEnvelope>, StoreError> {
    let mut name = None;
    let mut photo = None;
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(invalid_upload)?),
            Some("photo") => {
                let file_name = field.file_name().unwrap_or("photo").to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                if !bytes.is_empty() {
                    photo = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
        images: state.image_store(),
        folder: state.cloudinary.folder.clone(),
    };
    let user = usecase
        .execute(UpdateProfileInput {
            actor: session.user_id,
            user_id,
            name,
            photo,
        })
        .await?;
    Ok(Json(user.into()))
}

// ── PUT /auth/user/update/password/{user_id} ──────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn update_password(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<Json<UserEnvelope>, StoreError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(ChangePasswordInput {
            actor: session.user_id,
            user_id,
            old_password: body.old_password,
            new_password: body.new_password,
        })
        .await?;
    Ok(Json(user.into()))
}
