use uuid::Uuid;

use crate::domain::repository::{ImageStore, UserRepository};
use crate::domain::types::{ImageUpload, User};
use crate::error::StoreError;
use crate::usecase::{ensure_self, non_blank};

pub struct UpdateProfileInput {
    pub actor: Uuid,
    pub user_id: Uuid,
    pub name: Option<String>,
    pub photo: Option<ImageUpload>,
}

pub struct UpdateProfileUseCase<U, I>
where
    U: UserRepository,
    I: ImageStore,
{
    pub users: U,
    pub images: I,
    pub folder: String,
}

impl<U, I> UpdateProfileUseCase<U, I>
where
    U: UserRepository,
    I: ImageStore,
{
    pub async fn execute(&self, input: UpdateProfileInput) -> Result<User, StoreError> {
        ensure_self(input.actor, input.user_id)?;
        let user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        // Upload first so a failed upload leaves the current photo in place.
        let uploaded = match input.photo {
            Some(image) => Some(self.images.upload(&image, &self.folder).await?),
            None => None,
        };
        if let (Some(_), Some(old)) = (&uploaded, &user.photo)
            && let Err(e) = self.images.destroy(&old.public_id).await
        {
            tracing::warn!(
                user_id = %user.id,
                public_id = %old.public_id,
                error = ?e,
                "failed to destroy previous profile photo"
            );
        }

        let name = non_blank(input.name);
        self.users
            .update_profile(user.id, name.as_deref(), uploaded.as_ref())
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}
