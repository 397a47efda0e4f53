#![allow(clippy::unwrap_used)]
use storefront_cart::*;

    use storefront_cart::types::{Money, NewOrder, OrderItem, PaymentMethod, ProductId};
    use std::time::Duration;
    use storefront_testing::helpers::sample_shipping;
    use storefront_core::environment::Clock;
    use storefront_testing::{TestHarness, test_environment};

    fn seeded_order(harness: &TestHarness, payment_method: PaymentMethod) -> OrderId {
        let order = NewOrder {
            customer: CustomerId::new(),
            created_at: harness.clock.now(),
            total: Money::from_cents(2500),
            shipping: sample_shipping(),
            payment_method,
            items: vec![OrderItem {
                product_id: ProductId::new(),
                name: "Woolen Scarf".to_string(),
                quantity: 2,
                price: Money::from_cents(1250),
            }],
        };
        harness.orders.seed(order)
    }

    async fn settle() {
        // Let spawned notification tasks run.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn cancel_pending_succeeds_and_notifies() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);

        service.cancel(id).await.unwrap();
        settle().await;

        let order = harness.orders.order_by_id(id).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(matches!(
            harness.notifier.sent().as_slice(),
            [Notification::OrderCancelled(_)]
        ));
    }

    #[tokio::test]
    async fn cancel_shipped_is_rejected() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);
        harness.orders.force_status(id, OrderStatus::Shipped);

        let result = service.cancel(id).await;

        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Cancelled,
            })
        ));
        assert_eq!(
            harness.orders.order_by_id(id).unwrap().status,
            OrderStatus::Shipped
        );
    }

    #[tokio::test]
    async fn status_walks_the_happy_path() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);

        service
            .update_status(id, OrderStatus::Processing)
            .await
            .unwrap();
        service.update_status(id, OrderStatus::Shipped).await.unwrap();
        service
            .update_status(id, OrderStatus::Delivered)
            .await
            .unwrap();
        settle().await;

        let order = harness.orders.order_by_id(id).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        // Only the Shipped transition notifies on the happy path.
        assert!(matches!(
            harness.notifier.sent().as_slice(),
            [Notification::OrderShipped(_)]
        ));
    }

    #[tokio::test]
    async fn illegal_jumps_are_rejected_without_writes() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);

        let result = service.update_status(id, OrderStatus::Shipped).await;
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(
            harness.orders.order_by_id(id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn notifier_failure_never_rolls_back_the_transition() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);
        harness.notifier.set_fail(true);

        service
            .update_status(id, OrderStatus::Processing)
            .await
            .unwrap();
        service.update_status(id, OrderStatus::Shipped).await.unwrap();
        settle().await;

        assert_eq!(
            harness.orders.order_by_id(id).unwrap().status,
            OrderStatus::Shipped
        );
        assert!(harness.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());

        let result = service.update_status(OrderId::new(), OrderStatus::Processing).await;
        assert!(matches!(result, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn begin_payment_skips_the_gateway_for_cash() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::CashOnDelivery);

        let session = service.begin_payment(id).await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn begin_payment_returns_redirect_for_card() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());
        let id = seeded_order(&harness, PaymentMethod::Card);

        let session = service.begin_payment(id).await.unwrap().unwrap();
        assert!(session.redirect_url.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn history_lists_a_customers_orders_most_recent_first() {
        let harness = test_environment();
        let service = OrderService::new(harness.environment.clone());

        let customer = CustomerId::new();
        let early = NewOrder {
            customer,
            created_at: harness.clock.now(),
            total: Money::from_cents(1000),
            shipping: sample_shipping(),
            payment_method: PaymentMethod::CashOnDelivery,
            items: vec![],
        };
        let mut late = early.clone();
        late.created_at += chrono::Duration::hours(1);
        late.total = Money::from_cents(2000);

        harness.orders.seed(early);
        let late_id = harness.orders.seed(late);

        let history = service.history(customer).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, late_id);
    }
