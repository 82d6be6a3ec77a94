use sea_orm::entity::prelude::*;

/// Checkout record with a snapshot of the shipping info and the payment reference.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_phone_no: String,
    pub shipping_postal_code: String,
    pub shipping_state: String,
    pub shipping_country: Option<String>,
    pub total_amount: Decimal,
    pub payment_id: String,
    pub payment_receipt: String,
    pub payment_status: String,
    /// `ORDERED` | `SHIPPED` | `DELIVERED` | `CANCELLED`
    pub order_status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
