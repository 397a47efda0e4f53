//! Order materialization: one-shot conversion of a cart snapshot into a
//! persisted order.
//!
//! The whole sequence (snapshot, total, atomic repository write, cart
//! clear) runs inside a single `transact` section over the session's
//! state lock. A concurrent second submission serializes behind the lock,
//! finds the cart already empty, and short-circuits: one order per
//! snapshot.

use crate::cart::{CartCommand, CartReducer, CartState};
use crate::environment::{OrderRepository, StorefrontEnvironment};
use crate::error::CheckoutError;
use crate::types::{CustomerId, NewOrder, OrderId, OrderItem, PaymentMethod, ShippingDetails};
use futures::FutureExt;
use storefront_core::environment::Clock;
use storefront_runtime::Store;

/// The per-session store driving a cart through the [`CartReducer`]
pub type CartStore = Store<CartState, CartCommand, StorefrontEnvironment, CartReducer>;

/// Materialize a session's cart into a persisted order
///
/// Computes the exact total, writes one order plus one item per cart entry
/// through a single atomic repository call, and clears the cart only after
/// the write is durable. Performs no external network calls; payment-session
/// creation is a separate subsequent step keyed off the stored payment
/// method.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`] if the cart holds no items; nothing is
///   written and the caller must not proceed to payment.
/// - [`CheckoutError::Persistence`] if the atomic write fails; the cart is
///   left intact.
#[tracing::instrument(skip_all, fields(customer = %customer))]
pub async fn place_order(
    store: &CartStore,
    env: &StorefrontEnvironment,
    customer: CustomerId,
    shipping: ShippingDetails,
    payment_method: PaymentMethod,
) -> Result<OrderId, CheckoutError> {
    let env = env.clone();
    store
        .transact(move |cart: &mut CartState| {
            async move {
                if cart.is_empty() {
                    tracing::debug!("Checkout attempted with an empty cart");
                    return Err(CheckoutError::EmptyCart);
                }

                let items: Vec<OrderItem> = cart
                    .lines()
                    .map(|line| OrderItem {
                        product_id: line.product_id,
                        name: line.name,
                        quantity: line.quantity,
                        price: line.unit_price,
                    })
                    .collect();
                let total = cart.total();

                let order = NewOrder {
                    customer,
                    created_at: env.clock.now(),
                    total,
                    shipping,
                    payment_method,
                    items,
                };

                let order_id = env.orders.create(order).await?;

                // The write is durable; only now may the cart empty out.
                cart.clear();

                tracing::info!(%order_id, total_cents = total.cents(), "Order placed");
                Ok(order_id)
            }
            .boxed()
        })
        .await
}

