//! Per-session cart store registry.
//!
//! Each session owns exactly one cart store, created empty on first
//! interaction. All commands for a session serialize at its store's
//! reducer; distinct sessions share no mutable state. Sessions expire
//! after the configured idle TTL.

use crate::cart::{CartReducer, CartState};
use crate::checkout::CartStore;
use crate::config::SessionConfig;
use crate::environment::StorefrontEnvironment;
use crate::types::{CustomerId, SessionId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use storefront_core::environment::Clock;
use storefront_runtime::Store;
use tokio::sync::RwLock;

struct SessionSlot {
    store: Arc<CartStore>,
    last_seen: DateTime<Utc>,
}

/// Registry of live cart sessions
pub struct CartSessions {
    config: SessionConfig,
    environment: StorefrontEnvironment,
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
}

impl CartSessions {
    /// Creates an empty registry
    #[must_use]
    pub fn new(config: SessionConfig, environment: StorefrontEnvironment) -> Self {
        Self {
            config,
            environment,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The store for a session, creating an empty cart on first interaction
    ///
    /// `customer` binds the cart to an authenticated owner only at creation;
    /// later calls return the existing store unchanged. Every access
    /// refreshes the session's idle timer.
    pub async fn session(&self, id: SessionId, customer: Option<CustomerId>) -> Arc<CartStore> {
        let now = self.environment.clock.now();
        let mut sessions = self.sessions.write().await;
        let slot = sessions.entry(id).or_insert_with(|| {
            tracing::debug!(%id, "Creating cart session");
            SessionSlot {
                store: Arc::new(Store::new(
                    CartState::new(customer),
                    CartReducer::new(),
                    self.environment.clone(),
                )),
                last_seen: now,
            }
        });
        slot.last_seen = now;
        Arc::clone(&slot.store)
    }

    /// Drop a session and its cart; returns whether one existed
    pub async fn end_session(&self, id: SessionId) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drop every session idle for longer than the configured TTL
    ///
    /// Returns the number of sessions purged.
    pub async fn purge_expired(&self) -> usize {
        let now = self.environment.clock.now();
        let ttl = chrono::Duration::seconds(
            i64::try_from(self.config.session_ttl).unwrap_or(i64::MAX),
        );

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| now.signed_duration_since(slot.last_seen) < ttl);
        let purged = before - sessions.len();

        if purged > 0 {
            tracing::info!(purged, "Purged expired cart sessions");
        }
        purged
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are live
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

