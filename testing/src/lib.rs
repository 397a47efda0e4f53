//! # Storefront Testing
//!
//! Testing utilities and helpers for the storefront workspace.
//!
//! This crate provides:
//! - Mock implementations of every collaborator trait
//! - A ready-made [`test_environment`] bundling them
//! - Sample-data helpers
//! - A fluent Given-When-Then harness for reducer tests
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{test_environment, helpers::sample_product};
//!
//! #[tokio::test]
//! async fn add_then_view() {
//!     let harness = test_environment();
//!     harness.catalog.insert(sample_product("Woolen Scarf", 1250));
//!     // drive a CartService or CartStore against harness.environment
//! }
//! ```

use std::sync::Arc;
use storefront_cart::environment::StorefrontEnvironment;


pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of the collaborator traits
///
/// Every mock is in-memory, cheap to build, and inspectable from tests.
/// The order repository can additionally inject write delays and failures
/// for the double-submission and persistence-failure tests.
pub mod mocks {
    use chrono::{DateTime, Utc};
    use futures::future::BoxFuture;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;
    use storefront_cart::environment::{
        Catalog, Notification, Notifier, OrderRepository, PaymentGateway, PaymentSession,
        WishlistStore,
    };
    use storefront_cart::error::{
        CatalogError, NotifyError, PaymentGatewayError, RepositoryError,
    };
    use storefront_cart::types::{
        CustomerId, Money, NewOrder, Order, OrderId, OrderStatus, Product, ProductId,
    };
    use storefront_core::environment::Clock;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Settable clock for expiry tests
    ///
    /// Starts at a given instant and only moves when a test advances it.
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a manual clock starting at the given time
        #[must_use]
        pub const fn new(start: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(start),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Set the clock to an absolute instant
        pub fn set(&self, to: DateTime<Utc>) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time = to;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// In-memory catalog
    #[derive(Debug, Default)]
    pub struct InMemoryCatalog {
        products: Arc<Mutex<HashMap<ProductId, Product>>>,
    }

    impl InMemoryCatalog {
        /// Create an empty catalog
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Insert or replace a product
        pub fn insert(&self, product: Product) {
            self.products
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(product.id, product);
        }
    }

    impl Catalog for InMemoryCatalog {
        fn product(&self, id: ProductId) -> BoxFuture<'static, Result<Product, CatalogError>> {
            let products = Arc::clone(&self.products);
            Box::pin(async move {
                products
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&id)
                    .cloned()
                    .ok_or(CatalogError::NotFound(id))
            })
        }
    }

    /// In-memory order repository
    ///
    /// Writes are atomic (a single map insert under one lock). Tests can
    /// slow writes down with [`Self::set_write_delay`] to provoke
    /// double-submission races, or fail them with
    /// [`Self::set_fail_writes`].
    #[derive(Debug, Default)]
    pub struct InMemoryOrderRepository {
        orders: Arc<Mutex<HashMap<OrderId, Order>>>,
        write_delay: Arc<Mutex<Option<Duration>>>,
        fail_writes: Arc<AtomicBool>,
    }

    impl InMemoryOrderRepository {
        /// Create an empty repository
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every subsequent `create` by this much
        pub fn set_write_delay(&self, delay: Duration) {
            *self
                .write_delay
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(delay);
        }

        /// Make every subsequent `create` fail atomically
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Insert an order directly, bypassing delay and failure injection
        pub fn seed(&self, order: NewOrder) -> OrderId {
            let id = OrderId::new();
            self.orders
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, materialize(id, order));
            id
        }

        /// Overwrite an order's status, bypassing the state machine
        pub fn force_status(&self, id: OrderId, status: OrderStatus) {
            if let Some(order) = self
                .orders
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_mut(&id)
            {
                order.status = status;
            }
        }

        /// Number of persisted orders
        #[must_use]
        pub fn order_count(&self) -> usize {
            self.orders
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Fetch a persisted order without going through the trait
        #[must_use]
        pub fn order_by_id(&self, id: OrderId) -> Option<Order> {
            self.orders
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&id)
                .cloned()
        }
    }

    /// Orders are born Pending; the repository assigns the identifier.
    fn materialize(id: OrderId, order: NewOrder) -> Order {
        Order {
            id,
            customer: order.customer,
            created_at: order.created_at,
            total: order.total,
            shipping: order.shipping,
            status: OrderStatus::Pending,
            payment_method: order.payment_method,
            items: order.items,
        }
    }

    impl OrderRepository for InMemoryOrderRepository {
        fn create(&self, order: NewOrder) -> BoxFuture<'static, Result<OrderId, RepositoryError>> {
            let orders = Arc::clone(&self.orders);
            let write_delay = Arc::clone(&self.write_delay);
            let fail_writes = Arc::clone(&self.fail_writes);
            Box::pin(async move {
                let delay = *write_delay.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }

                if fail_writes.load(Ordering::SeqCst) {
                    return Err(RepositoryError::WriteFailed(
                        "injected write failure".to_string(),
                    ));
                }

                let id = OrderId::new();
                orders
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(id, materialize(id, order));
                Ok(id)
            })
        }

        fn order(&self, id: OrderId) -> BoxFuture<'static, Result<Order, RepositoryError>> {
            let orders = Arc::clone(&self.orders);
            Box::pin(async move {
                orders
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&id)
                    .cloned()
                    .ok_or(RepositoryError::NotFound(id))
            })
        }

        fn history(
            &self,
            customer: CustomerId,
        ) -> BoxFuture<'static, Result<Vec<Order>, RepositoryError>> {
            let orders = Arc::clone(&self.orders);
            Box::pin(async move {
                let mut history: Vec<Order> = orders
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .values()
                    .filter(|order| order.customer == customer)
                    .cloned()
                    .collect();
                history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                Ok(history)
            })
        }

        fn update_status(
            &self,
            id: OrderId,
            status: OrderStatus,
        ) -> BoxFuture<'static, Result<(), RepositoryError>> {
            let orders = Arc::clone(&self.orders);
            Box::pin(async move {
                let mut orders = orders.lock().unwrap_or_else(PoisonError::into_inner);
                match orders.get_mut(&id) {
                    Some(order) => {
                        order.status = status;
                        Ok(())
                    },
                    None => Err(RepositoryError::NotFound(id)),
                }
            })
        }
    }

    /// In-memory wishlist
    #[derive(Debug, Default)]
    pub struct InMemoryWishlist {
        items: Arc<Mutex<HashMap<(CustomerId, ProductId), DateTime<Utc>>>>,
    }

    impl InMemoryWishlist {
        /// Create an empty wishlist store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Whether a customer currently wishes for a product
        #[must_use]
        pub fn contains(&self, customer: CustomerId, product: ProductId) -> bool {
            self.items
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&(customer, product))
        }
    }

    impl WishlistStore for InMemoryWishlist {
        fn add(
            &self,
            customer: CustomerId,
            product: ProductId,
            added_at: DateTime<Utc>,
        ) -> BoxFuture<'static, bool> {
            let items = Arc::clone(&self.items);
            Box::pin(async move {
                use std::collections::hash_map::Entry;
                match items
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry((customer, product))
                {
                    Entry::Vacant(entry) => {
                        entry.insert(added_at);
                        true
                    },
                    Entry::Occupied(_) => false,
                }
            })
        }

        fn remove(&self, customer: CustomerId, product: ProductId) -> BoxFuture<'static, bool> {
            let items = Arc::clone(&self.items);
            Box::pin(async move {
                items
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&(customer, product))
                    .is_some()
            })
        }

        fn count(&self, customer: CustomerId) -> BoxFuture<'static, usize> {
            let items = Arc::clone(&self.items);
            Box::pin(async move {
                items
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys()
                    .filter(|(owner, _)| *owner == customer)
                    .count()
            })
        }
    }

    /// Notifier that records every message instead of delivering it
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        sent: Arc<Mutex<Vec<Notification>>>,
        fail: Arc<AtomicBool>,
    }

    impl RecordingNotifier {
        /// Create a recording notifier
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent dispatch fail
        pub fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }

        /// Every notification dispatched so far
        #[must_use]
        pub fn sent(&self) -> Vec<Notification> {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(
            &self,
            notification: Notification,
        ) -> BoxFuture<'static, Result<(), NotifyError>> {
            let sent = Arc::clone(&self.sent);
            let fail = Arc::clone(&self.fail);
            Box::pin(async move {
                if fail.load(Ordering::SeqCst) {
                    return Err(NotifyError::Dispatch(
                        "injected notifier failure".to_string(),
                    ));
                }
                sent.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(notification);
                Ok(())
            })
        }
    }

    /// Mock payment gateway (always opens a session)
    ///
    /// Simulates a short network delay and returns a deterministic redirect
    /// target embedding the order identifier.
    #[derive(Clone, Debug, Default)]
    pub struct MockPaymentGateway;

    impl MockPaymentGateway {
        /// Creates a new mock payment gateway
        #[must_use]
        pub const fn new() -> Self {
            Self
        }
    }

    impl PaymentGateway for MockPaymentGateway {
        fn payment_session(
            &self,
            order_id: OrderId,
            amount: Money,
        ) -> BoxFuture<'static, Result<PaymentSession, PaymentGatewayError>> {
            Box::pin(async move {
                // Simulate network delay
                tokio::time::sleep(Duration::from_millis(10)).await;

                tracing::info!(
                    %order_id,
                    amount_cents = amount.cents(),
                    "Mock payment session opened"
                );

                Ok(PaymentSession {
                    redirect_url: format!("https://payments.example/checkout/{order_id}"),
                })
            })
        }
    }
}

/// Sample-data helpers
pub mod helpers {
    use chrono::Utc;
    use storefront_cart::types::{Money, Product, ProductId, ShippingDetails};

    /// An available catalog product with the given name and price in cents
    #[must_use]
    pub fn sample_product(name: &str, price_cents: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            description: format!("{name} (sample)"),
            price: Money::from_cents(price_cents),
            is_available: true,
            created_at: Utc::now(),
        }
    }

    /// Shipping details for tests
    #[must_use]
    pub fn sample_shipping() -> ShippingDetails {
        ShippingDetails {
            full_name: "Asha Tamang".to_string(),
            address: "12 Lakeside Road, Pokhara".to_string(),
            phone: "+977-9800000000".to_string(),
        }
    }
}

/// All mocks wired into one environment, with handles kept for inspection
pub struct TestHarness {
    /// In-memory catalog
    pub catalog: Arc<mocks::InMemoryCatalog>,
    /// In-memory order repository
    pub orders: Arc<mocks::InMemoryOrderRepository>,
    /// In-memory wishlist
    pub wishlist: Arc<mocks::InMemoryWishlist>,
    /// Recording notifier
    pub notifier: Arc<mocks::RecordingNotifier>,
    /// Mock payment gateway
    pub gateway: Arc<mocks::MockPaymentGateway>,
    /// Fixed clock (2025-01-01 00:00:00 UTC)
    pub clock: Arc<mocks::FixedClock>,
    /// The environment bundle handed to reducers and services
    pub environment: StorefrontEnvironment,
}

/// Build a [`TestHarness`] with every collaborator mocked
#[must_use]
pub fn test_environment() -> TestHarness {
    let catalog = Arc::new(mocks::InMemoryCatalog::new());
    let orders = Arc::new(mocks::InMemoryOrderRepository::new());
    let wishlist = Arc::new(mocks::InMemoryWishlist::new());
    let notifier = Arc::new(mocks::RecordingNotifier::new());
    let gateway = Arc::new(mocks::MockPaymentGateway::new());
    let clock = Arc::new(mocks::test_clock());

    let environment = StorefrontEnvironment::new(
        Arc::clone(&catalog) as _,
        Arc::clone(&orders) as _,
        Arc::clone(&wishlist) as _,
        Arc::clone(&notifier) as _,
        Arc::clone(&gateway) as _,
        Arc::clone(&clock) as _,
    );

    TestHarness {
        catalog,
        orders,
        wishlist,
        notifier,
        gateway,
        clock,
        environment,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use storefront_cart::environment::{OrderRepository, WishlistStore};
    use storefront_cart::types::{CustomerId, Money, NewOrder, OrderId, ProductId};
    use storefront_core::environment::Clock;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn manual_clock_advances_on_demand() {
        let clock = mocks::ManualClock::new(test_clock().now());
        let start = clock.now();
        clock.advance(chrono::Duration::seconds(30));
        assert_eq!(clock.now() - start, chrono::Duration::seconds(30));
    }

    #[tokio::test]
    async fn repository_write_failure_persists_nothing() {
        let harness = test_environment();
        harness.orders.set_fail_writes(true);

        let result = harness
            .environment
            .orders
            .create(NewOrder {
                customer: CustomerId::new(),
                created_at: harness.clock.now(),
                total: Money::from_cents(100),
                shipping: helpers::sample_shipping(),
                payment_method: storefront_cart::types::PaymentMethod::CashOnDelivery,
                items: vec![],
            })
            .await;

        assert!(result.is_err());
        assert_eq!(harness.orders.order_count(), 0);
    }

    #[tokio::test]
    async fn wishlist_roundtrip() {
        let harness = test_environment();
        let customer = CustomerId::new();
        let product = ProductId::new();

        assert!(
            harness
                .environment
                .wishlist
                .add(customer, product, harness.clock.now())
                .await
        );
        assert!(harness.wishlist.contains(customer, product));
        assert!(harness.environment.wishlist.remove(customer, product).await);
        assert!(!harness.wishlist.contains(customer, product));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let harness = test_environment();
        let result = harness.environment.orders.order(OrderId::new()).await;
        assert!(result.is_err());
    }
}
