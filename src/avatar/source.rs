use std::path::Path;

use crate::avatar::config::AvatarConfig;
use crate::foundation::error::AvatarError;

/// Why a [`ConfigSource`] settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyReason {
    /// A response arrived and was parsed.
    Loaded,
    /// The fetch failed or the response was not JSON.
    Failed,
    /// No response arrived in time.
    TimedOut,
}

/// Where a [`ConfigSource`] is in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigState {
    /// Nothing has arrived yet; the default avatar is drawn.
    Loading,
    /// Settled for good.
    Ready {
        /// The configuration to draw.
        config: AvatarConfig,
        /// How the source settled.
        reason: ReadyReason,
    },
}

/// Two-state loader for an externally fetched configuration.
///
/// Starts in `Loading` and settles exactly once. A response, a failure or a timeout
/// all end in `Ready`; failures and timeouts settle on [`AvatarConfig::default`].
/// Events that arrive after settling are ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigSource {
    state: ConfigState,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource {
    /// A source still waiting for its configuration.
    pub fn new() -> Self {
        Self {
            state: ConfigState::Loading,
        }
    }

    /// Reads `path` and settles immediately.
    pub fn from_path(path: &Path) -> Self {
        let mut source = Self::new();
        match std::fs::read_to_string(path) {
            Ok(body) => source.on_response(&body),
            Err(e) => source.on_failed(&AvatarError::config_load(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
        source
    }

    /// Current state.
    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    /// `true` once the source has settled.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ConfigState::Ready { .. })
    }

    /// The configuration to draw right now: the settled one, or the default while
    /// still loading.
    pub fn current(&self) -> AvatarConfig {
        match &self.state {
            ConfigState::Loading => AvatarConfig::default(),
            ConfigState::Ready { config, .. } => config.clone(),
        }
    }

    /// A response body arrived. JSON that parses is read field by field; fields that
    /// are missing, empty or of the wrong type keep their defaults. Unparseable bodies count
    /// as a failure.
    pub fn on_response(&mut self, body: &str) {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(v) => self.settle(AvatarConfig::from_json_lenient(&v), ReadyReason::Loaded),
            Err(e) => self.on_failed(&AvatarError::from(e)),
        }
    }

    /// The fetch failed; settles on the default configuration.
    pub fn on_failed(&mut self, err: &AvatarError) {
        if self.is_ready() {
            return;
        }
        tracing::warn!(error = %err, "avatar config load failed; using default");
        self.settle(AvatarConfig::default(), ReadyReason::Failed);
    }

    /// No response in time; settles on the default configuration.
    pub fn on_timeout(&mut self) {
        if self.is_ready() {
            return;
        }
        tracing::warn!("avatar config load timed out; using default");
        self.settle(AvatarConfig::default(), ReadyReason::TimedOut);
    }

    fn settle(&mut self, config: AvatarConfig, reason: ReadyReason) {
        if self.is_ready() {
            tracing::debug!(?reason, "config source already settled; ignoring");
            return;
        }
        self.state = ConfigState::Ready { config, reason };
    }
}

#[cfg(test)]
#[path = "../../tests/unit/avatar/source.rs"]
mod tests;
