//! Runtime configuration.

use std::time::Duration;

/// A configuration value the tick loop cannot run with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A rate was zero, negative, or not finite.
    #[error("{name} must be a positive, finite number of hertz, got {value}")]
    InvalidRate {
        /// Which rate.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// `max_fixed_steps` was zero, which would drop every fixed step.
    #[error("max_fixed_steps must be at least 1")]
    NoFixedSteps,
}

/// Accept `value` as a rate in hertz.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidRate`] unless `value` is finite and above zero.
pub fn check_rate(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidRate { name, value })
    }
}

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Fixed-timestep boundaries per second.
    pub fixed_rate: f64,
    /// Most fixed steps run in one tick before the backlog is dropped.
    pub max_fixed_steps: u32,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// How often entity positions are logged. `None` disables the watch.
    pub watch_interval: Option<Duration>,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            fixed_rate: 50.0,
            max_fixed_steps: 5,
            max_ticks: 0,
            watch_interval: Some(Duration::from_secs(3)),
        }
    }
}

impl TickConfig {
    /// Set the target tick rate.
    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Set the fixed-timestep rate.
    #[must_use]
    pub fn with_fixed_rate(mut self, fixed_rate: f64) -> Self {
        self.fixed_rate = fixed_rate;
        self
    }

    /// Stop after `max_ticks` ticks.
    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Set or disable the position watch.
    #[must_use]
    pub fn with_watch_interval(mut self, interval: Option<Duration>) -> Self {
        self.watch_interval = interval;
        self
    }

    /// Check that the loop can run with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a rate that is not a positive finite number
    /// or for a zero fixed-step cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("tick_rate", self.tick_rate)?;
        check_rate("fixed_rate", self.fixed_rate)?;
        if self.max_fixed_steps == 0 {
            return Err(ConfigError::NoFixedSteps);
        }
        Ok(())
    }

    /// Wall-clock budget of one tick. Only meaningful once
    /// [`validate`](Self::validate) has passed.
    #[must_use]
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate)
    }

    /// Seconds covered by one fixed step.
    #[must_use]
    pub fn fixed_dt(&self) -> f64 {
        1.0 / self.fixed_rate
    }
}

/// Configuration for the connection handshake.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// Identity announced in the init request.
    pub local_player: String,
    /// Delay between unanswered requests.
    pub retry_interval: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            local_player: uuid::Uuid::new_v4().to_string(),
            retry_interval: Duration::from_secs(1),
        }
    }
}

impl HandshakeConfig {
    /// Announce `player` instead of a random identity.
    #[must_use]
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.local_player = player.into();
        self
    }

    /// Set the retry interval.
    #[must_use]
    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }
}

/// Everything the client binary needs to run.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub tick: TickConfig,
    pub handshake: HandshakeConfig,
    /// Explicit NATS URL; `None` defers to `NATS_URL` and then the default.
    pub nats_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.tick.tick_rate, 60.0);
        assert_eq!(config.tick.max_fixed_steps, 5);
        assert!((config.tick.fixed_dt() - 0.02).abs() < 1e-12);
        assert_eq!(config.handshake.retry_interval, Duration::from_secs(1));
        assert!(uuid::Uuid::parse_str(&config.handshake.local_player).is_ok());
        assert!(config.nats_url.is_none());
    }

    #[test]
    fn test_builders() {
        let tick = TickConfig::default()
            .with_tick_rate(1000.0)
            .with_max_ticks(5)
            .with_watch_interval(None);
        assert_eq!(tick.tick_duration(), Duration::from_millis(1));
        assert_eq!(tick.max_ticks, 5);
        assert!(tick.watch_interval.is_none());

        let handshake = HandshakeConfig::default().with_player("alice");
        assert_eq!(handshake.local_player, "alice");
    }

    #[test]
    fn test_validate_rejects_unusable_rates() {
        assert!(TickConfig::default().validate().is_ok());

        for bad in [0.0, -60.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                TickConfig::default().with_tick_rate(bad).validate(),
                Err(ConfigError::InvalidRate { name: "tick_rate", .. })
            ));
            assert!(matches!(
                TickConfig::default().with_fixed_rate(bad).validate(),
                Err(ConfigError::InvalidRate { name: "fixed_rate", .. })
            ));
        }

        let no_steps = TickConfig {
            max_fixed_steps: 0,
            ..TickConfig::default()
        };
        assert_eq!(no_steps.validate(), Err(ConfigError::NoFixedSteps));
    }

    #[test]
    fn test_check_rate() {
        assert_eq!(check_rate("tick_rate", 30.0), Ok(30.0));
        assert!(check_rate("tick_rate", 0.0).is_err());
    }
}
