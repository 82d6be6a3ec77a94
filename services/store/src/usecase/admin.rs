use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::pagination::PageRequest;
use cakeorder_domain::user::UserRole;

use crate::domain::repository::{OrderRepository, UserRepository};
use crate::domain::types::{Order, User};
use crate::error::StoreError;
use crate::usecase::ensure_self;

/// Admin routes carry the admin's id in the path. The caller must be that
/// user, and the stored role (not the token claim) must be `ADMIN`.
pub async fn require_admin<U: UserRepository>(
    users: &U,
    actor: Uuid,
    admin_id: Uuid,
) -> Result<User, StoreError> {
    ensure_self(actor, admin_id)?;
    match users.find_by_id(admin_id).await? {
        Some(admin) if admin.role.is_admin() => Ok(admin),
        _ => Err(StoreError::Forbidden),
    }
}

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(
        &self,
        actor: Uuid,
        admin_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<User>, StoreError> {
        require_admin(&self.users, actor, admin_id).await?;
        self.users.list(page.clamped()).await
    }
}

pub struct UpdateRoleInput {
    pub actor: Uuid,
    pub admin_id: Uuid,
    pub user_id: Uuid,
    pub role: Option<UserRole>,
}

pub struct UpdateRoleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateRoleUseCase<U> {
    pub async fn execute(&self, input: UpdateRoleInput) -> Result<User, StoreError> {
        require_admin(&self.users, input.actor, input.admin_id).await?;
        let role = input.role.ok_or(StoreError::MissingField("role"))?;
        let user = self
            .users
            .update_role(input.user_id, role)
            .await?
            .ok_or(StoreError::UserNotFound)?;
        tracing::info!(admin_id = %input.admin_id, user_id = %user.id, role = ?role, "user role changed");
        Ok(user)
    }
}

pub struct ListAllOrdersUseCase<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    pub users: U,
    pub orders: O,
}

impl<U, O> ListAllOrdersUseCase<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    pub async fn execute(
        &self,
        actor: Uuid,
        admin_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Order>, StoreError> {
        require_admin(&self.users, actor, admin_id).await?;
        self.orders.list(page.clamped()).await
    }
}

pub struct UpdateOrderStatusInput {
    pub actor: Uuid,
    pub admin_id: Uuid,
    pub order_id: Uuid,
    pub status: Option<OrderStatus>,
}

pub struct UpdateOrderStatusUseCase<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    pub users: U,
    pub orders: O,
}

impl<U, O> UpdateOrderStatusUseCase<U, O>
where
    U: UserRepository,
    O: OrderRepository,
{
    pub async fn execute(&self, input: UpdateOrderStatusInput) -> Result<Order, StoreError> {
        require_admin(&self.users, input.actor, input.admin_id).await?;
        let status = input.status.ok_or(StoreError::MissingField("orderStatus"))?;
        let order = self
            .orders
            .update_status(input.order_id, status)
            .await?
            .ok_or(StoreError::OrderNotFound)?;
        tracing::info!(order_id = %order.id, status = %status, "order status changed");
        Ok(order)
    }
}
