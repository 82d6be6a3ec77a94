//! Razorpay Orders API client.
//!
//! `POST {base_url}/v1/orders` with HTTP basic auth (`key_id:key_secret`).
//! Amounts are in minor currency units.

use serde::{Deserialize, Serialize};

use crate::config::RazorpayConfig;
use crate::domain::repository::PaymentGateway;
use crate::domain::types::{ChargeRequest, PaymentRef, ShippingInfo};
use crate::error::StoreError;

#[derive(Clone)]
pub struct RazorpayGateway {
    pub client: reqwest::Client,
    pub config: RazorpayConfig,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: &'a ShippingInfo,
}

#[derive(Deserialize)]
struct RazorpayOrder {
    id: String,
    receipt: Option<String>,
    status: String,
}

impl PaymentGateway for RazorpayGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentRef, StoreError> {
        let url = format!("{}/v1/orders", self.config.base_url);
        let body = CreateOrderBody {
            amount: request.amount,
            currency: &request.currency,
            receipt: &request.receipt,
            notes: &request.notes,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(receipt = %request.receipt, error = %e, "payment provider unreachable");
                StoreError::PaymentFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                receipt = %request.receipt,
                status = status.as_u16(),
                detail = %detail,
                "payment provider rejected charge"
            );
            return Err(StoreError::PaymentFailed);
        }

        let order: RazorpayOrder = response.json().await.map_err(|e| {
            tracing::error!(receipt = %request.receipt, error = %e, "unreadable payment provider response");
            StoreError::PaymentFailed
        })?;

        Ok(PaymentRef {
            id: order.id,
            receipt: order.receipt.unwrap_or_else(|| request.receipt.clone()),
            status: order.status,
        })
    }
}
