//! Identity SDK script loader
//!
//! `load()` resolves once the SDK's entry point is reachable. A load cycle
//! either waits for a script element another caller already added, or
//! injects one and re-checks after a short settle delay. Failed cycles are
//! retried with exponential backoff; only the last failure is surfaced.

use std::sync::Arc;
use std::time::Duration;

use bookline_common::resilience::{retry, RetryConfig};
use bookline_domain::constants::{SDK_SCRIPT_MARKER, SDK_SCRIPT_URL};
use bookline_domain::{AuthError, LoaderConfig};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::ports::ScriptInjector;

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Floor for the in-flight poll so a zero interval still yields to the timer
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Loads the identity SDK script at most once per page
pub struct ScriptLoader {
    injector: Arc<dyn ScriptInjector>,
    config: LoaderConfig,
    src: String,
}

impl ScriptLoader {
    pub fn new(injector: Arc<dyn ScriptInjector>, config: LoaderConfig) -> Self {
        Self { injector, config, src: SDK_SCRIPT_URL.to_string() }
    }

    /// Override the script source (tests and self-hosted SDK mirrors)
    #[must_use]
    pub fn with_source(mut self, src: impl Into<String>) -> Self {
        self.src = src.into();
        self
    }

    /// Load the SDK, retrying whole cycles on failure.
    ///
    /// Safe to call any number of times: once the SDK is reachable this
    /// returns immediately without touching the page.
    ///
    /// # Errors
    /// Returns `AuthError::ScriptLoad` carrying the last cycle's failure
    pub async fn load(&self) -> Result<(), AuthError> {
        if self.injector.sdk_available() {
            return Ok(());
        }

        let policy = RetryConfig::builder()
            .max_attempts(self.config.max_attempts)
            .exponential_backoff(self.config.initial_backoff, 2.0, MAX_BACKOFF)
            .no_jitter()
            .build()
            .map_err(|e| AuthError::ScriptLoad(e.to_string()))?;

        retry(&policy, |attempt| async move {
            debug!(attempt = attempt + 1, "loading identity SDK");
            self.load_once().await
        })
        .await
        .map_err(|e| {
            AuthError::ScriptLoad(
                e.into_last_error().unwrap_or_else(|| "invalid loader configuration".to_string()),
            )
        })?;

        info!("identity SDK loaded");
        Ok(())
    }

    async fn load_once(&self) -> Result<(), String> {
        if self.injector.sdk_available() {
            return Ok(());
        }

        if self.injector.script_present(SDK_SCRIPT_MARKER) {
            return self.wait_for_existing().await;
        }

        if let Err(reason) = self.injector.inject(&self.src).await {
            warn!(reason = %reason, "identity SDK script failed to load");
            return Err("Failed to load Google authentication script".to_string());
        }

        // Some SDKs fire "load" before exposing their API
        tokio::time::sleep(self.config.settle_delay).await;
        if self.injector.sdk_available() {
            Ok(())
        } else {
            Err("Google APIs not available after script load".to_string())
        }
    }

    async fn wait_for_existing(&self) -> Result<(), String> {
        let poll = self.config.poll_interval.max(MIN_POLL_INTERVAL);
        let deadline = Instant::now() + self.config.max_wait;
        loop {
            tokio::time::sleep(poll).await;

            if self.injector.sdk_available() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err("Google script loading timeout".to_string());
            }
        }
    }
}
