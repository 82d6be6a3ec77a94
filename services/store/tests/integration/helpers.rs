use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::pagination::PageRequest;
use cakeorder_domain::user::UserRole;
use cakeorder_store::auth::password::hash_password;
use cakeorder_store::domain::repository::{
    ImageStore, MailSender, OrderRepository, OutboxRepository, PaymentGateway, UserRepository,
};
use cakeorder_store::domain::types::{
    ChargeRequest, ImageUpload, MailMessage, Order, OrderItem, OutboxEvent, PaymentRef,
    PendingOutboxEvent, Photo, ShippingInfo, User,
};
use cakeorder_store::error::StoreError;

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub events: Arc<Mutex<Vec<OutboxEvent>>>,
    /// Another request consumes the reset token right after each `find_by_id`.
    pub reset_token_taken_after_read: bool,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            events: Arc::new(Mutex::new(vec![])),
            reset_token_taken_after_read: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the stored users for post-execution inspection.
    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }

    /// Shared handle to the outbox events written alongside user changes.
    pub fn events_handle(&self) -> Arc<Mutex<Vec<OutboxEvent>>> {
        Arc::clone(&self.events)
    }

    fn modify<T>(&self, id: Uuid, f: impl FnOnce(&mut User) -> T) -> Option<T> {
        let mut users = self.users.lock().unwrap();
        users.iter_mut().find(|u| u.id == id).map(|u| {
            u.updated_at = Utc::now();
            f(u)
        })
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let found = self.users.lock().unwrap().iter().find(|u| u.id == id).cloned();
        if self.reset_token_taken_after_read {
            self.modify(id, |u| {
                u.reset_password_token = None;
                u.reset_password_expires = None;
            });
        }
        Ok(found)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_verify_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.verify_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create_with_outbox(
        &self,
        user: &User,
        event: &OutboxEvent,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UserAlreadyExists);
        }
        users.push(user.clone());
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn increment_login_count(&self, id: Uuid) -> Result<(), StoreError> {
        self.modify(id, |u| u.login_count += 1);
        Ok(())
    }

    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), StoreError> {
        self.modify(id, |u| {
            u.reset_password_token = Some(token.to_owned());
            u.reset_password_expires = Some(expires_at);
        });
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        self.modify(id, |u| {
            u.password_hash = password_hash.to_owned();
            u.reset_password_token = None;
            u.reset_password_expires = None;
        });
        Ok(())
    }

    async fn reset_password(
        &self,
        id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let now = Utc::now();
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| {
            u.id == id
                && u.reset_password_token.as_deref() == Some(token)
                && u.reset_password_expires.is_some_and(|exp| exp > now)
        }) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_owned();
        user.reset_password_token = None;
        user.reset_password_expires = None;
        user.updated_at = now;
        Ok(true)
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<(), StoreError> {
        self.modify(id, |u| {
            u.email_verified = true;
            u.verify_token = None;
        });
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        photo: Option<&Photo>,
    ) -> Result<Option<User>, StoreError> {
        Ok(self.modify(id, |u| {
            if let Some(name) = name {
                u.name = name.to_owned();
            }
            if let Some(photo) = photo {
                u.photo = Some(photo.clone());
            }
            u.clone()
        }))
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, StoreError> {
        Ok(self.modify(id, |u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<User>, StoreError> {
        let page = page.clamped();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect())
    }
}

// ── MockOrderRepo ────────────────────────────────────────────────────────────

pub struct MockOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
    /// product id → (stock, sold)
    pub stock: Arc<Mutex<HashMap<Uuid, (i32, i32)>>>,
    pub fail_create: bool,
}

impl MockOrderRepo {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Arc::new(Mutex::new(orders)),
            stock: Arc::new(Mutex::new(HashMap::new())),
            fail_create: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn with_stock(self, product_id: Uuid, stock: i32) -> Self {
        self.stock.lock().unwrap().insert(product_id, (stock, 0));
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::empty()
        }
    }

    pub fn orders_handle(&self) -> Arc<Mutex<Vec<Order>>> {
        Arc::clone(&self.orders)
    }

    pub fn stock_handle(&self) -> Arc<Mutex<HashMap<Uuid, (i32, i32)>>> {
        Arc::clone(&self.stock)
    }
}

impl OrderRepository for MockOrderRepo {
    async fn create_with_stock(&self, order: &Order) -> Result<(), StoreError> {
        if self.fail_create {
            return Err(anyhow::anyhow!("connection reset").into());
        }
        let mut stock = self.stock.lock().unwrap();
        for item in &order.items {
            if let Some((left, sold)) = stock.get_mut(&item.product_id) {
                *left -= item.quantity;
                *sold += item.quantity;
            }
        }
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Order>, StoreError> {
        let page = page.clamped();
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        Ok(orders.iter_mut().find(|o| o.id == id).map(|o| {
            o.status = status;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }
}

// ── MockPaymentGateway ───────────────────────────────────────────────────────

pub struct MockPaymentGateway {
    pub charges: Arc<Mutex<Vec<ChargeRequest>>>,
    pub fail: bool,
}

impl MockPaymentGateway {
    pub fn ok() -> Self {
        Self {
            charges: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn charges_handle(&self) -> Arc<Mutex<Vec<ChargeRequest>>> {
        Arc::clone(&self.charges)
    }
}

impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentRef, StoreError> {
        self.charges.lock().unwrap().push(request.clone());
        if self.fail {
            return Err(StoreError::PaymentFailed);
        }
        Ok(PaymentRef {
            id: "order_TEST123".to_owned(),
            receipt: request.receipt.clone(),
            status: "created".to_owned(),
        })
    }
}

// ── MockImageStore ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockImageStore {
    pub uploads: Arc<Mutex<Vec<String>>>,
    pub destroyed: Arc<Mutex<Vec<String>>>,
    pub fail_upload: bool,
    pub fail_destroy: bool,
}

impl MockImageStore {
    pub fn uploads_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.uploads)
    }

    pub fn destroyed_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.destroyed)
    }
}

impl ImageStore for MockImageStore {
    async fn upload(&self, image: &ImageUpload, folder: &str) -> Result<Photo, StoreError> {
        if self.fail_upload {
            return Err(anyhow::anyhow!("upload rejected").into());
        }
        let public_id = format!("{folder}/{}", image.file_name);
        self.uploads.lock().unwrap().push(public_id.clone());
        Ok(Photo {
            secure_url: format!("https://img.example.com/{public_id}"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), StoreError> {
        if self.fail_destroy {
            return Err(anyhow::anyhow!("destroy rejected").into());
        }
        self.destroyed.lock().unwrap().push(public_id.to_owned());
        Ok(())
    }
}

// ── MockOutboxRepo ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OutboxRow {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub next_attempt_at: DateTime<Utc>,
    pub processed: bool,
    pub failed: bool,
}

impl OutboxRow {
    pub fn due(event: &OutboxEvent, attempts: i32) -> Self {
        Self {
            id: event.id,
            kind: event.kind.clone(),
            payload: event.payload.clone(),
            attempts,
            last_error: None,
            next_attempt_at: Utc::now() - chrono::Duration::seconds(1),
            processed: false,
            failed: false,
        }
    }
}

pub struct MockOutboxRepo {
    pub rows: Arc<Mutex<Vec<OutboxRow>>>,
}

impl MockOutboxRepo {
    pub fn new(rows: Vec<OutboxRow>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(rows)),
        }
    }

    pub fn rows_handle(&self) -> Arc<Mutex<Vec<OutboxRow>>> {
        Arc::clone(&self.rows)
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut OutboxRow)) {
        if let Some(row) = self.rows.lock().unwrap().iter_mut().find(|r| r.id == id) {
            f(row);
        }
    }
}

impl OutboxRepository for MockOutboxRepo {
    async fn fetch_due(&self, limit: u64) -> Result<Vec<PendingOutboxEvent>, StoreError> {
        let now = Utc::now();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !r.processed && !r.failed && r.next_attempt_at <= now)
            .take(limit as usize)
            .map(|r| PendingOutboxEvent {
                id: r.id,
                kind: r.kind.clone(),
                payload: r.payload.clone(),
                attempts: r.attempts,
            })
            .collect())
    }

    async fn mark_processed(&self, id: Uuid) -> Result<(), StoreError> {
        self.modify(id, |r| r.processed = true);
        Ok(())
    }

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.modify(id, |r| {
            r.attempts = attempts;
            r.last_error = Some(error.to_owned());
            r.next_attempt_at = next_attempt_at;
        });
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, attempts: i32, error: &str) -> Result<(), StoreError> {
        self.modify(id, |r| {
            r.attempts = attempts;
            r.last_error = Some(error.to_owned());
            r.failed = true;
        });
        Ok(())
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub fail: bool,
}

impl MockMailer {
    pub fn sent_handle(&self) -> Arc<Mutex<Vec<MailMessage>>> {
        Arc::clone(&self.sent)
    }
}

impl MailSender for MockMailer {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";
pub const TEST_VERIFY_SECRET: &str = "test-verify-secret-for-unit-tests-only";
pub const TEST_DOMAIN_URL: &str = "https://shop.example.com";
pub const TEST_PASSWORD: &str = "red-velvet";

pub fn test_user() -> User {
    let now = Utc::now();
    User {
        id: Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
        name: "Baker".to_owned(),
        email: "baker@example.com".to_owned(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role: UserRole::User,
        photo: None,
        reset_password_token: None,
        reset_password_expires: None,
        verify_token: None,
        email_verified: false,
        login_count: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_admin() -> User {
    User {
        id: Uuid::parse_str("00000000-0000-0000-0000-0000000000ad").unwrap(),
        name: "Admin".to_owned(),
        email: "admin@example.com".to_owned(),
        role: UserRole::Admin,
        ..test_user()
    }
}

pub fn test_shipping() -> ShippingInfo {
    ShippingInfo {
        address: "221B Baker Street".to_owned(),
        city: "Pune".to_owned(),
        phone_no: "9876543210".to_owned(),
        postal_code: "411001".to_owned(),
        state: "Maharashtra".to_owned(),
        country: Some("India".to_owned()),
    }
}

pub fn test_item(product_id: Uuid, quantity: i32, price: i64) -> OrderItem {
    OrderItem {
        product_id,
        name: "Chocolate truffle".to_owned(),
        quantity,
        price: Decimal::new(price, 0),
    }
}

pub fn test_order(user_id: Uuid) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::now_v7(),
        user_id,
        shipping_info: test_shipping(),
        items: vec![test_item(Uuid::now_v7(), 1, 500)],
        total_amount: Decimal::new(500, 0),
        payment: PaymentRef {
            id: "order_EXISTING".to_owned(),
            receipt: Uuid::new_v4().to_string(),
            status: "created".to_owned(),
        },
        status: OrderStatus::Ordered,
        created_at: now,
        updated_at: now,
    }
}
