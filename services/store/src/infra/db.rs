use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::pagination::PageRequest;
use cakeorder_domain::user::UserRole;
use cakeorder_store_schema::{order_items, orders, outbox_events, products, users};

use crate::domain::repository::{OrderRepository, OutboxRepository, UserRepository};
use crate::domain::types::{
    Order, OrderItem, OutboxEvent, PaymentRef, PendingOutboxEvent, Photo, ShippingInfo, User,
};
use crate::error::StoreError;

fn is_unique_violation(err: &TransactionError<DbErr>) -> bool {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        }
    }
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    async fn find_model(&self, id: Uuid) -> Result<Option<users::Model>, StoreError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model)
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.find_model(id).await?.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_verify_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::VerifyToken.eq(token))
            .one(&self.db)
            .await
            .context("find user by verify token")?;
        Ok(model.map(user_from_model))
    }

    async fn create_with_outbox(
        &self,
        user: &User,
        event: &OutboxEvent,
    ) -> Result<(), StoreError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                let event = event.clone();
                Box::pin(async move {
                    insert_user(txn, &user).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await;
        match result {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UserAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e)
                .context("create user with outbox")
                .into()),
        }
    }

    async fn increment_login_count(&self, id: Uuid) -> Result<(), StoreError> {
        users::Entity::update_many()
            .col_expr(
                users::Column::LoginCount,
                Expr::col(users::Column::LoginCount).add(1),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("increment login count")?;
        Ok(())
    }

    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let token = token.to_owned();
                let event = event.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(id),
                        reset_password_token: Set(Some(token)),
                        reset_password_expires: Set(Some(expires_at)),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("store reset token with outbox")?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            reset_password_token: Set(None),
            reset_password_expires: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password")?;
        Ok(())
    }

    async fn reset_password(
        &self,
        id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let now = Utc::now();
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                users::Column::ResetPasswordToken,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                users::Column::ResetPasswordExpires,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::ResetPasswordToken.eq(token))
            .filter(users::Column::ResetPasswordExpires.gt(now))
            .exec(&self.db)
            .await
            .context("reset password")?;
        Ok(result.rows_affected == 1)
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(id),
            email_verified: Set(true),
            verify_token: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark email verified")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        photo: Option<&Photo>,
    ) -> Result<Option<User>, StoreError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        if let Some(name) = name {
            active.name = Set(name.to_owned());
        }
        if let Some(photo) = photo {
            active.photo_public_id = Set(Some(photo.public_id.clone()));
            active.photo_secure_url = Set(Some(photo.secure_url.clone()));
        }
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await.context("update profile")?;
        Ok(Some(user_from_model(model)))
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, StoreError> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        active.role = Set(i16::from(role.as_u8()));
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await.context("update role")?;
        Ok(Some(user_from_model(model)))
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, StoreError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.clamped().per_page))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }
}

async fn insert_user(txn: &DatabaseTransaction, user: &User) -> Result<(), DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        email: Set(user.email.clone()),
        password_hash: Set(user.password_hash.clone()),
        role: Set(i16::from(user.role.as_u8())),
        photo_public_id: Set(user.photo.as_ref().map(|p| p.public_id.clone())),
        photo_secure_url: Set(user.photo.as_ref().map(|p| p.secure_url.clone())),
        reset_password_token: Set(None),
        reset_password_expires: Set(None),
        verify_token: Set(user.verify_token.clone()),
        email_verified: Set(user.email_verified),
        login_count: Set(user.login_count),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(txn: &DatabaseTransaction, event: &OutboxEvent) -> Result<(), DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn user_from_model(model: users::Model) -> User {
    let role = u8::try_from(model.role)
        .ok()
        .and_then(UserRole::from_u8)
        .unwrap_or_default();
    let photo = match (model.photo_public_id, model.photo_secure_url) {
        (Some(public_id), Some(secure_url)) => Some(Photo {
            public_id,
            secure_url,
        }),
        _ => None,
    };
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role,
        photo,
        reset_password_token: model.reset_password_token,
        reset_password_expires: model.reset_password_expires,
        verify_token: model.verify_token,
        email_verified: model.email_verified,
        login_count: model.login_count,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Order repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn create_with_stock(&self, order: &Order) -> Result<(), StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    insert_order(txn, &order).await?;
                    for item in &order.items {
                        deduct_stock(txn, item).await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("create order with stock")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        let mut found = with_items(&self.db, vec![model])
            .await
            .context("load order items")?;
        Ok(found.pop())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders by user")?;
        Ok(with_items(&self.db, models)
            .await
            .context("load order items")?)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Order>, StoreError> {
        let models = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.clamped().per_page))
            .all(&self.db)
            .await
            .context("list orders")?;
        Ok(with_items(&self.db, models)
            .await
            .context("load order items")?)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        let mut active = model.into_active_model();
        active.order_status = Set(status.as_str().to_owned());
        active.updated_at = Set(Utc::now());
        let model = active
            .update(&self.db)
            .await
            .context("update order status")?;
        let mut updated = with_items(&self.db, vec![model])
            .await
            .context("load order items")?;
        Ok(updated.pop())
    }
}

async fn insert_order(txn: &DatabaseTransaction, order: &Order) -> Result<(), DbErr> {
    let shipping = &order.shipping_info;
    orders::ActiveModel {
        id: Set(order.id),
        user_id: Set(order.user_id),
        shipping_address: Set(shipping.address.clone()),
        shipping_city: Set(shipping.city.clone()),
        shipping_phone_no: Set(shipping.phone_no.clone()),
        shipping_postal_code: Set(shipping.postal_code.clone()),
        shipping_state: Set(shipping.state.clone()),
        shipping_country: Set(shipping.country.clone()),
        total_amount: Set(order.total_amount),
        payment_id: Set(order.payment.id.clone()),
        payment_receipt: Set(order.payment.receipt.clone()),
        payment_status: Set(order.payment.status.clone()),
        order_status: Set(order.status.as_str().to_owned()),
        created_at: Set(order.created_at),
        updated_at: Set(order.updated_at),
    }
    .insert(txn)
    .await?;

    let items = order
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| order_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            order_id: Set(order.id),
            product_id: Set(item.product_id),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            price: Set(item.price),
            position: Set(position as i32),
        });
    order_items::Entity::insert_many(items).exec(txn).await?;
    Ok(())
}

async fn deduct_stock(txn: &DatabaseTransaction, item: &OrderItem) -> Result<(), DbErr> {
    let result = products::Entity::update_many()
        .col_expr(
            products::Column::Stock,
            Expr::col(products::Column::Stock).sub(item.quantity),
        )
        .col_expr(
            products::Column::Sold,
            Expr::col(products::Column::Sold).add(item.quantity),
        )
        .col_expr(products::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(products::Column::Id.eq(item.product_id))
        .exec(txn)
        .await?;
    if result.rows_affected == 0 {
        tracing::warn!(product_id = %item.product_id, "ordered product does not exist; stock unchanged");
    }
    Ok(())
}

/// Load the items of every order in one query, keeping the orders' order.
async fn with_items<C: ConnectionTrait>(
    db: &C,
    models: Vec<orders::Model>,
) -> Result<Vec<Order>, DbErr> {
    if models.is_empty() {
        return Ok(vec![]);
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut items: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(ids))
        .order_by_asc(order_items::Column::Position)
        .all(db)
        .await?
    {
        items.entry(item.order_id).or_default().push(OrderItem {
            product_id: item.product_id,
            name: item.name,
            quantity: item.quantity,
            price: item.price,
        });
    }
    Ok(models
        .into_iter()
        .map(|model| {
            let items = items.remove(&model.id).unwrap_or_default();
            order_from_model(model, items)
        })
        .collect())
}

fn order_from_model(model: orders::Model, items: Vec<OrderItem>) -> Order {
    let status = model.order_status.parse().unwrap_or_else(|e| {
        tracing::warn!(order_id = %model.id, error = %e, "stored order status unreadable");
        OrderStatus::default()
    });
    Order {
        id: model.id,
        user_id: model.user_id,
        shipping_info: ShippingInfo {
            address: model.shipping_address,
            city: model.shipping_city,
            phone_no: model.shipping_phone_no,
            postal_code: model.shipping_postal_code,
            state: model.shipping_state,
            country: model.shipping_country,
        },
        items,
        total_amount: model.total_amount,
        payment: PaymentRef {
            id: model.payment_id,
            receipt: model.payment_receipt,
            status: model.payment_status,
        },
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Outbox repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOutboxRepository {
    pub db: DatabaseConnection,
}

impl OutboxRepository for DbOutboxRepository {
    async fn fetch_due(&self, limit: u64) -> Result<Vec<PendingOutboxEvent>, StoreError> {
        let models = outbox_events::Entity::find()
            .filter(outbox_events::Column::ProcessedAt.is_null())
            .filter(outbox_events::Column::FailedAt.is_null())
            .filter(outbox_events::Column::NextAttemptAt.lte(Utc::now()))
            .order_by_asc(outbox_events::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .context("fetch due outbox events")?;
        Ok(models
            .into_iter()
            .map(|m| PendingOutboxEvent {
                id: m.id,
                kind: m.kind,
                payload: m.payload,
                attempts: m.attempts,
            })
            .collect())
    }

    async fn mark_processed(&self, id: Uuid) -> Result<(), StoreError> {
        outbox_events::ActiveModel {
            id: Set(id),
            processed_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event processed")?;
        Ok(())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            next_attempt_at: Set(next_attempt_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("schedule outbox retry")?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, attempts: i32, error: &str) -> Result<(), StoreError> {
        outbox_events::ActiveModel {
            id: Set(id),
            attempts: Set(attempts),
            last_error: Set(Some(error.to_owned())),
            failed_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark outbox event failed")?;
        Ok(())
    }
}
