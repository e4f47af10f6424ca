//! Busy indicators that always clear.
//!
//! A [`LoadingGuard`] raises one or more [`LoadingKey`]s when engaged and
//! lowers each of them exactly once: when the guard is dropped, or earlier
//! if its backstop timer fires first. The backstop is independent of the
//! transport timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::frontend::{Frontend, LoadingKey, StatusKind};

/// Status shown when the backstop fires.
pub const LOADING_TIMEOUT_MESSAGE: &str = "Loading timed out. Please try again.";

pub const DEFAULT_LOADING_TIMEOUT: Duration = Duration::from_secs(30);

struct Indicators {
    frontend: Arc<dyn Frontend>,
    keys: Vec<LoadingKey>,
    released: AtomicBool,
}

impl Indicators {
    /// Lowers every key. Returns `false` if already released.
    fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        for key in &self.keys {
            self.frontend.set_loading(key, false);
        }
        true
    }
}

/// RAII handle over a set of raised loading indicators.
///
/// Must be engaged from within a tokio runtime.
pub struct LoadingGuard {
    indicators: Arc<Indicators>,
    backstop: Option<JoinHandle<()>>,
}

impl LoadingGuard {
    /// Raises `keys` and arms a backstop that clears them after `timeout`.
    /// A zero timeout disables the backstop.
    pub fn engage(
        frontend: Arc<dyn Frontend>,
        keys: impl IntoIterator<Item = LoadingKey>,
        timeout: Duration,
    ) -> Self {
        let keys: Vec<LoadingKey> = keys.into_iter().collect();
        for key in &keys {
            frontend.set_loading(key, true);
        }
        let indicators = Arc::new(Indicators {
            frontend,
            keys,
            released: AtomicBool::new(false),
        });

        let backstop = (!timeout.is_zero()).then(|| {
            let indicators = Arc::clone(&indicators);
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                if !indicators.release() {
                    return;
                }
                tracing::warn!(keys = ?indicators.keys, ?timeout, "loading backstop fired");
                if indicators.keys.contains(&LoadingKey::FileList) {
                    indicators.frontend.render_placeholder(LOADING_TIMEOUT_MESSAGE);
                }
                indicators
                    .frontend
                    .show_status(LOADING_TIMEOUT_MESSAGE, StatusKind::Error);
            })
        });

        Self {
            indicators,
            backstop,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(timer) = self.backstop.take() {
            timer.abort();
        }
        self.indicators.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeFrontend};

    #[tokio::test]
    async fn engage_raises_and_drop_lowers() {
        let frontend = FakeFrontend::new();
        let guard = LoadingGuard::engage(
            frontend.clone(),
            [LoadingKey::Refresh, LoadingKey::FileList],
            DEFAULT_LOADING_TIMEOUT,
        );
        assert_eq!(frontend.loading_for(&LoadingKey::Refresh), vec![true]);

        drop(guard);

        assert_eq!(frontend.loading_for(&LoadingKey::Refresh), vec![true, false]);
        assert_eq!(frontend.loading_for(&LoadingKey::FileList), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn backstop_fires_once_and_drop_is_silent() {
        let frontend = FakeFrontend::new();
        let guard = LoadingGuard::engage(
            frontend.clone(),
            [LoadingKey::FileList],
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(frontend.loading_for(&LoadingKey::FileList), vec![true, false]);
        assert!(frontend
            .calls()
            .contains(&Call::Placeholder(LOADING_TIMEOUT_MESSAGE.to_string())));
        assert_eq!(
            frontend.last_status(),
            Some((LOADING_TIMEOUT_MESSAGE.to_string(), StatusKind::Error))
        );

        drop(guard);
        assert_eq!(frontend.loading_for(&LoadingKey::FileList), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn backstop_without_file_list_skips_placeholder() {
        let frontend = FakeFrontend::new();
        let _guard = LoadingGuard::engage(
            frontend.clone(),
            [LoadingKey::Upload],
            Duration::from_secs(5),
        );

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(!frontend
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Placeholder(_))));
        assert_eq!(frontend.loading_for(&LoadingKey::Upload), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_guard_never_times_out() {
        let frontend = FakeFrontend::new();
        drop(LoadingGuard::engage(
            frontend.clone(),
            [LoadingKey::Connect],
            Duration::from_secs(1),
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(frontend.loading_for(&LoadingKey::Connect), vec![true, false]);
        assert!(frontend.statuses().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_disables_backstop() {
        let frontend = FakeFrontend::new();
        let guard = LoadingGuard::engage(frontend.clone(), [LoadingKey::Report], Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(frontend.loading_for(&LoadingKey::Report), vec![true]);

        drop(guard);
        assert_eq!(frontend.loading_for(&LoadingKey::Report), vec![true, false]);
    }
}
