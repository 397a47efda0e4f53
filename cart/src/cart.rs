//! The session cart: state, commands and the reducer.
//!
//! A cart is an explicit per-session state value driven by [`CartCommand`]
//! through the pure [`CartReducer`]. Entries capture the product's name
//! and unit price at add time. Quantities are always at least one; an
//! entry whose quantity would fall to zero is removed, never stored.

use crate::environment::{StorefrontEnvironment, WishlistStore};
use crate::types::{CustomerId, Money, Product, ProductId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use storefront_core::SmallVec;
use storefront_core::effect::Effect;
use storefront_core::reducer::Reducer;
use storefront_core::smallvec;

/// One product's entry in a cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Product name captured at add time, for rendering
    pub name: String,
    /// Quantity in the cart, always ≥ 1
    pub quantity: u32,
    /// Unit price captured at add time
    pub unit_price: Money,
}

impl CartEntry {
    /// Line total for this entry (`unit_price × quantity`)
    #[must_use]
    pub const fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price.cents() * self.quantity as i64)
    }
}

/// One rendered cart line, as produced by [`CartState::lines`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product this line refers to
    pub product_id: ProductId,
    /// Product name captured at add time
    pub name: String,
    /// Quantity in the cart
    pub quantity: u32,
    /// Unit price captured at add time
    pub unit_price: Money,
    /// `unit_price × quantity`
    pub line_total: Money,
}

/// State of one session's cart
///
/// Created empty on the session's first interaction, mutated only by
/// reducer commands, and cleared atomically when an order is successfully
/// materialized from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartState {
    customer: Option<CustomerId>,
    entries: HashMap<ProductId, CartEntry>,
}

impl CartState {
    /// Creates an empty cart owned by an (optionally authenticated) session
    #[must_use]
    pub fn new(customer: Option<CustomerId>) -> Self {
        Self {
            customer,
            entries: HashMap::new(),
        }
    }

    /// The authenticated owner of this cart's session, if any
    #[must_use]
    pub const fn customer(&self) -> Option<CustomerId> {
        self.customer
    }

    /// Number of distinct products in the cart
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry for a product, if present
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries.get(product_id)
    }

    /// Lazy, restartable iteration over the cart's lines
    ///
    /// Each call starts a fresh pass; line totals are computed on the fly
    /// from the captured unit prices.
    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.entries.iter().map(|(product_id, entry)| CartLine {
            product_id: *product_id,
            name: entry.name.clone(),
            quantity: entry.quantity,
            unit_price: entry.unit_price,
            line_total: entry.line_total(),
        })
    }

    /// Exact cart total: the sum of all line totals
    #[must_use]
    pub fn total(&self) -> Money {
        Money::from_cents(
            self.entries
                .values()
                .map(|entry| entry.line_total().cents())
                .sum(),
        )
    }

    /// Empties the cart
    ///
    /// Called only after the order write is durable.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(None)
    }
}

/// The direction of a quantity update
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityDelta {
    /// Increment the quantity by one
    Increase,
    /// Decrement the quantity by one, removing the entry at zero
    Decrease,
}

/// Commands mutating a session's cart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CartCommand {
    /// Add one unit of a product, inserting an entry on first add
    ///
    /// The product is resolved by the caller through the catalog; its price
    /// and name are captured into the entry here.
    AddItem {
        /// The catalog product being added
        product: Product,
    },

    /// Remove a product's entry unconditionally; absence is benign
    RemoveItem {
        /// Product to remove
        product_id: ProductId,
    },

    /// Increment a product's quantity by one; unknown ids are a no-op
    IncreaseQuantity {
        /// Product to increment
        product_id: ProductId,
    },

    /// Decrement a product's quantity by one, removing the entry when it
    /// would reach zero; unknown ids are a no-op
    DecreaseQuantity {
        /// Product to decrement
        product_id: ProductId,
    },
}

/// Reducer implementing the cart's business logic
///
/// All arms mutate state in place and return at most one effect: adding a
/// product to an authenticated session's cart emits a fire-and-forget
/// wishlist removal for the same product.
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new cart reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartCommand;
    type Environment = StorefrontEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CartCommand::AddItem { product } => {
                let product_id = product.id;
                match state.entries.get_mut(&product_id) {
                    Some(entry) => entry.quantity += 1,
                    None => {
                        state.entries.insert(
                            product_id,
                            CartEntry {
                                name: product.name,
                                quantity: 1,
                                unit_price: product.price,
                            },
                        );
                    },
                }

                // A carted product leaves the customer's wishlist.
                let Some(customer) = state.customer else {
                    return SmallVec::new();
                };
                let wishlist = Arc::clone(&env.wishlist);
                smallvec![Effect::future(async move {
                    if wishlist.remove(customer, product_id).await {
                        tracing::debug!(%product_id, "Removed wishlist entry for carted product");
                    }
                    None
                })]
            },

            CartCommand::RemoveItem { product_id } => {
                state.entries.remove(&product_id);
                SmallVec::new()
            },

            CartCommand::IncreaseQuantity { product_id } => {
                if let Some(entry) = state.entries.get_mut(&product_id) {
                    entry.quantity += 1;
                }
                SmallVec::new()
            },

            CartCommand::DecreaseQuantity { product_id } => {
                let remove = match state.entries.get_mut(&product_id) {
                    Some(entry) if entry.quantity <= 1 => true,
                    Some(entry) => {
                        entry.quantity -= 1;
                        false
                    },
                    None => false,
                };
                if remove {
                    state.entries.remove(&product_id);
                }
                SmallVec::new()
            },
        }
    }
}

