use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_store::error::StoreError;
use cakeorder_store::usecase::order::{
    CreateOrderInput, CreateOrderUseCase, GetOrderUseCase, ListOrdersUseCase,
};

use crate::helpers::{
    MockOrderRepo, MockPaymentGateway, test_item, test_order, test_shipping, test_user,
};

fn usecase(
    orders: MockOrderRepo,
    payments: MockPaymentGateway,
) -> CreateOrderUseCase<MockOrderRepo, MockPaymentGateway> {
    CreateOrderUseCase {
        orders,
        payments,
        currency: "INR".to_owned(),
    }
}

fn checkout(user_id: Uuid, product_id: Uuid, total: &str) -> CreateOrderInput {
    CreateOrderInput {
        actor: user_id,
        user_id,
        shipping_info: Some(test_shipping()),
        items: vec![test_item(product_id, 2, 250)],
        total_amount: Some(Decimal::from_str(total).unwrap()),
    }
}

// ── CreateOrderUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_charge_total_in_minor_units_and_persist_order() {
    let user = test_user();
    let product_id = Uuid::now_v7();
    let repo = MockOrderRepo::empty().with_stock(product_id, 10);
    let orders = repo.orders_handle();
    let stock = repo.stock_handle();
    let payments = MockPaymentGateway::ok();
    let charges = payments.charges_handle();

    let order = usecase(repo, payments)
        .execute(checkout(user.id, product_id, "499.99"))
        .await
        .unwrap();

    let charges = charges.lock().unwrap();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount, 49999);
    assert_eq!(charges[0].currency, "INR");
    assert_eq!(charges[0].notes, test_shipping());

    assert_eq!(order.user_id, user.id);
    assert_eq!(order.status, OrderStatus::Ordered);
    assert_eq!(order.payment.id, "order_TEST123");
    assert_eq!(order.payment.receipt, charges[0].receipt);
    assert_eq!(order.total_amount, Decimal::from_str("499.99").unwrap());

    assert_eq!(orders.lock().unwrap().len(), 1);
    assert_eq!(stock.lock().unwrap()[&product_id], (8, 2));
}

#[tokio::test]
async fn should_persist_nothing_when_payment_fails() {
    let user = test_user();
    let product_id = Uuid::now_v7();
    let repo = MockOrderRepo::empty().with_stock(product_id, 10);
    let orders = repo.orders_handle();
    let stock = repo.stock_handle();

    let result = usecase(repo, MockPaymentGateway::failing())
        .execute(checkout(user.id, product_id, "500"))
        .await;

    assert!(matches!(result, Err(StoreError::PaymentFailed)));
    assert!(orders.lock().unwrap().is_empty());
    assert_eq!(stock.lock().unwrap()[&product_id], (10, 0));
}

#[tokio::test]
async fn should_report_order_failed_when_persistence_fails_after_charge() {
    let user = test_user();
    let payments = MockPaymentGateway::ok();
    let charges = payments.charges_handle();

    let result = usecase(MockOrderRepo::failing(), payments)
        .execute(checkout(user.id, Uuid::now_v7(), "500"))
        .await;

    assert!(matches!(result, Err(StoreError::OrderFailed)));
    assert_eq!(charges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_not_charge_invalid_checkout() {
    let user = test_user();
    let payments = MockPaymentGateway::ok();
    let charges = payments.charges_handle();
    let mut input = checkout(user.id, Uuid::now_v7(), "500");
    input.items.clear();

    let result = usecase(MockOrderRepo::empty(), payments).execute(input).await;

    assert!(
        matches!(&result, Err(StoreError::InvalidOrder(m)) if m == "orderItems must not be empty"),
        "got {result:?}"
    );
    assert!(charges.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_not_charge_amounts_the_order_cannot_store() {
    let user = test_user();
    let payments = MockPaymentGateway::ok();
    let charges = payments.charges_handle();
    let repo = MockOrderRepo::empty();
    let orders = repo.orders_handle();
    let create = usecase(repo, payments);

    let too_precise = create
        .execute(checkout(user.id, Uuid::now_v7(), "10.005"))
        .await;
    let too_large = create
        .execute(checkout(user.id, Uuid::now_v7(), "12345678901"))
        .await;
    let mut huge_price = checkout(user.id, Uuid::now_v7(), "500");
    huge_price.items[0].price = Decimal::from_str("99999999999999.999").unwrap();
    let huge_price = create.execute(huge_price).await;

    assert!(matches!(too_precise, Err(StoreError::InvalidOrder(_))));
    assert!(matches!(too_large, Err(StoreError::InvalidOrder(_))));
    assert!(matches!(huge_price, Err(StoreError::InvalidOrder(_))));
    assert!(charges.lock().unwrap().is_empty());
    assert!(orders.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_missing_shipping_info() {
    let user = test_user();
    let mut input = checkout(user.id, Uuid::now_v7(), "500");
    input.shipping_info = None;

    let result = usecase(MockOrderRepo::empty(), MockPaymentGateway::ok())
        .execute(input)
        .await;
    assert!(matches!(result, Err(StoreError::InvalidOrder(_))));
}

#[tokio::test]
async fn should_forbid_ordering_for_another_user() {
    let user = test_user();
    let payments = MockPaymentGateway::ok();
    let charges = payments.charges_handle();
    let mut input = checkout(user.id, Uuid::now_v7(), "500");
    input.actor = Uuid::now_v7();

    let result = usecase(MockOrderRepo::empty(), payments).execute(input).await;

    assert!(matches!(result, Err(StoreError::Forbidden)));
    assert!(charges.lock().unwrap().is_empty());
}

// ── ListOrdersUseCase / GetOrderUseCase ──────────────────────────────────────

#[tokio::test]
async fn should_list_only_own_orders_newest_first() {
    let user = test_user();
    let mut older = test_order(user.id);
    older.created_at -= chrono::Duration::hours(1);
    let newer = test_order(user.id);
    let foreign = test_order(Uuid::now_v7());

    let orders = ListOrdersUseCase {
        orders: MockOrderRepo::new(vec![older.clone(), foreign, newer.clone()]),
    }
    .execute(user.id, user.id)
    .await
    .unwrap();

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn should_get_own_order() {
    let user = test_user();
    let order = test_order(user.id);

    let found = GetOrderUseCase {
        orders: MockOrderRepo::new(vec![order.clone()]),
    }
    .execute(user.id, user.id, order.id)
    .await
    .unwrap();
    assert_eq!(found.id, order.id);
}

#[tokio::test]
async fn should_forbid_reading_order_of_another_user() {
    let user = test_user();
    let order = test_order(Uuid::now_v7());

    let result = GetOrderUseCase {
        orders: MockOrderRepo::new(vec![order.clone()]),
    }
    .execute(user.id, user.id, order.id)
    .await;
    assert!(matches!(result, Err(StoreError::Forbidden)));
}

#[tokio::test]
async fn should_return_not_found_for_unknown_order() {
    let user = test_user();
    let result = GetOrderUseCase {
        orders: MockOrderRepo::empty(),
    }
    .execute(user.id, user.id, Uuid::now_v7())
    .await;
    assert!(matches!(result, Err(StoreError::OrderNotFound)));
}
