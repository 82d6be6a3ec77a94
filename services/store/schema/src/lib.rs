//! sea-orm entities for the store service.

pub mod order_items;
pub mod orders;
pub mod outbox_events;
pub mod products;
pub mod users;
