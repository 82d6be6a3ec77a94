use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;

use crate::domain::repository::{OrderRepository, PaymentGateway};
use crate::domain::types::{ChargeRequest, MAX_AMOUNT, Order, OrderItem, ShippingInfo};
use crate::error::StoreError;
use crate::usecase::ensure_self;

pub struct CreateOrderInput {
    pub actor: Uuid,
    pub user_id: Uuid,
    pub shipping_info: Option<ShippingInfo>,
    pub items: Vec<OrderItem>,
    pub total_amount: Option<Decimal>,
}

fn invalid(msg: &str) -> StoreError {
    StoreError::InvalidOrder(msg.to_owned())
}

/// At most two decimal places and no larger than the stored column allows.
fn is_storable_amount(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2 && amount <= MAX_AMOUNT
}

/// Check the checkout body and return the shipping info and amount in minor
/// units.
fn validate(input: &CreateOrderInput) -> Result<(ShippingInfo, Decimal, i64), StoreError> {
    let shipping = input
        .shipping_info
        .clone()
        .ok_or_else(|| invalid("shippingInfo is required"))?;
    let required = [
        ("address", &shipping.address),
        ("city", &shipping.city),
        ("phoneNo", &shipping.phone_no),
        ("postalCode", &shipping.postal_code),
        ("state", &shipping.state),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(StoreError::InvalidOrder(format!(
            "shippingInfo.{field} is required"
        )));
    }

    if input.items.is_empty() {
        return Err(invalid("orderItems must not be empty"));
    }
    if input.items.iter().any(|item| item.quantity < 1) {
        return Err(invalid("every item quantity must be at least 1"));
    }
    if input.items.iter().any(|item| item.price.is_sign_negative()) {
        return Err(invalid("item prices must not be negative"));
    }
    if input.items.iter().any(|item| !is_storable_amount(item.price)) {
        return Err(invalid(
            "item prices must have at most 2 decimals and not exceed 9999999999.99",
        ));
    }

    let total = input
        .total_amount
        .filter(|t| *t > Decimal::ZERO)
        .ok_or_else(|| invalid("totalAmount must be greater than 0"))?;
    if !is_storable_amount(total) {
        return Err(invalid(
            "totalAmount must have at most 2 decimals and not exceed 9999999999.99",
        ));
    }
    let minor = total
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|m| m.normalize().to_i64())
        .ok_or_else(|| invalid("totalAmount is out of range"))?;
    Ok((shipping, total, minor))
}

pub struct CreateOrderUseCase<O, P>
where
    O: OrderRepository,
    P: PaymentGateway,
{
    pub orders: O,
    pub payments: P,
    pub currency: String,
}

impl<O, P> CreateOrderUseCase<O, P>
where
    O: OrderRepository,
    P: PaymentGateway,
{
    pub async fn execute(&self, input: CreateOrderInput) -> Result<Order, StoreError> {
        ensure_self(input.actor, input.user_id)?;
        let (shipping_info, total_amount, amount) = validate(&input)?;

        let payment = self
            .payments
            .charge(&ChargeRequest {
                amount,
                currency: self.currency.clone(),
                receipt: Uuid::new_v4().to_string(),
                notes: shipping_info.clone(),
            })
            .await?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            shipping_info,
            items: input.items,
            total_amount,
            payment,
            status: OrderStatus::Ordered,
            created_at: now,
            updated_at: now,
        };

        // The charge already went through; there is no automatic refund.
        if let Err(e) = self.orders.create_with_stock(&order).await {
            tracing::error!(
                user_id = %order.user_id,
                payment_id = %order.payment.id,
                receipt = %order.payment.receipt,
                error = ?e,
                "order persistence failed after successful charge"
            );
            return Err(StoreError::OrderFailed);
        }

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            payment_id = %order.payment.id,
            "order created"
        );
        Ok(order)
    }
}

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(&self, actor: Uuid, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        ensure_self(actor, user_id)?;
        self.orders.list_by_user(user_id).await
    }
}

pub struct GetOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> GetOrderUseCase<O> {
    pub async fn execute(
        &self,
        actor: Uuid,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Order, StoreError> {
        ensure_self(actor, user_id)?;
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(StoreError::Forbidden);
        }
        Ok(order)
    }
}
