//! Cloudinary signed upload API.
//!
//! Requests are signed with SHA-256 over the alphabetically sorted
//! `key=value` parameters followed by the API secret.

use anyhow::{Context as _, anyhow};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use cakeorder_auth_types::token::now_secs;

use crate::config::CloudinaryConfig;
use crate::domain::repository::ImageStore;
use crate::domain::types::{ImageUpload, Photo};
use crate::error::StoreError;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Clone)]
pub struct CloudinaryStore {
    pub client: reqwest::Client,
    pub config: CloudinaryConfig,
}

/// Hex SHA-256 of the sorted, `&`-joined params with the secret appended.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{api_secret}").as_bytes()))
}

#[derive(Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryStore {
    fn url(&self, action: &str) -> String {
        format!("{API_BASE}/{}/image/{action}", self.config.cloud_name)
    }

    /// Signed form with `api_key`, `timestamp`, `signature` and the given params.
    fn signed_form(&self, params: &[(&str, &str)]) -> Form {
        let timestamp = now_secs().to_string();
        let mut signed = params.to_vec();
        signed.push(("timestamp", &timestamp));
        let signature = sign(&signed, &self.config.api_secret);

        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (k, v) in signed {
            form = form.text(k.to_owned(), v.to_owned());
        }
        form
    }
}

impl ImageStore for CloudinaryStore {
    async fn upload(&self, image: &ImageUpload, folder: &str) -> Result<Photo, StoreError> {
        let mut part = Part::bytes(image.bytes.to_vec()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part
                .mime_str(content_type)
                .with_context(|| format!("invalid image content type {content_type}"))?;
        }
        let form = self.signed_form(&[("folder", folder)]).part("file", part);

        let response = self
            .client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await
            .context("send image upload")?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("image upload rejected ({status}): {detail}").into());
        }
        let uploaded: UploadResponse = response.json().await.context("read image upload response")?;
        Ok(Photo {
            public_id: uploaded.public_id,
            secure_url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), StoreError> {
        let form = self.signed_form(&[("public_id", public_id)]);
        let response = self
            .client
            .post(self.url("destroy"))
            .multipart(form)
            .send()
            .await
            .context("send image destroy")?
            .error_for_status()
            .context("image destroy rejected")?;
        let destroyed: DestroyResponse =
            response.json().await.context("read image destroy response")?;
        // "not found" means there is nothing left to clean up.
        match destroyed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(anyhow!("image destroy returned {other}").into()),
        }
    }
}
