//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// The block evaluates to `Option<Action>`; `Some` is fed back into the reducer.
///
/// # Example
///
/// ```rust,ignore
/// use storefront_core::async_effect;
///
/// let api = Arc::clone(&env.api);
/// async_effect! {
///     match api.fetch_events().await {
///         Ok(events) => Some(StorefrontAction::EventsLoaded { events }),
///         Err(error) => Some(StorefrontAction::EventsFailed { error: error.to_string() }),
///     }
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum TestAction {
        Loaded { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::Loaded { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[tokio::test]
    async fn test_async_effect_resolves_to_action() {
        let value = 7;
        let effect = async_effect! {
            Some(TestAction::Loaded { value })
        };

        let Effect::Future(fut) = effect else {
            unreachable!("async_effect! always builds Effect::Future");
        };
        assert_eq!(fut.await, Some(TestAction::Loaded { value: 7 }));
    }
}
