#![allow(clippy::unwrap_used)]
use std::sync::Arc;
use storefront_cart::*;

    use storefront_cart::cart::CartCommand;
    use storefront_testing::helpers::sample_product;
    use storefront_testing::mocks::ManualClock;
    use storefront_testing::test_environment;

    #[tokio::test]
    async fn same_session_shares_one_store() {
        let harness = test_environment();
        let sessions = CartSessions::new(SessionConfig::default(), harness.environment.clone());
        let id = SessionId::new();

        let store = sessions.session(id, None).await;
        store
            .send(CartCommand::AddItem {
                product: sample_product("Woolen Scarf", 1000),
            })
            .await
            .unwrap();

        let same = sessions.session(id, None).await;
        assert_eq!(same.state(CartState::len).await, 1);
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_sessions_are_isolated() {
        let harness = test_environment();
        let sessions = CartSessions::new(SessionConfig::default(), harness.environment.clone());

        let first = sessions.session(SessionId::new(), None).await;
        let second = sessions.session(SessionId::new(), None).await;

        first
            .send(CartCommand::AddItem {
                product: sample_product("Woolen Scarf", 1000),
            })
            .await
            .unwrap();

        assert_eq!(first.state(CartState::len).await, 1);
        assert!(second.state(CartState::is_empty).await);
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn idle_sessions_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let harness = test_environment();
        let environment = StorefrontEnvironment {
            clock: Arc::clone(&clock) as _,
            ..harness.environment
        };
        let config = SessionConfig { session_ttl: 60 };
        let sessions = CartSessions::new(config, environment);

        let idle = SessionId::new();
        sessions.session(idle, None).await;

        clock.advance(chrono::Duration::seconds(120));
        let fresh = SessionId::new();
        sessions.session(fresh, None).await;

        let purged = sessions.purge_expired().await;
        assert_eq!(purged, 1);
        assert_eq!(sessions.len().await, 1);

        // The surviving session is the one touched after the clock moved.
        sessions.session(fresh, None).await;
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test]
    async fn end_session_drops_the_cart() {
        let harness = test_environment();
        let sessions = CartSessions::new(SessionConfig::default(), harness.environment.clone());
        let id = SessionId::new();

        sessions.session(id, None).await;
        assert!(sessions.end_session(id).await);
        assert!(!sessions.end_session(id).await);
        assert!(sessions.is_empty().await);
    }
