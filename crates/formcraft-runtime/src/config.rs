//! Editor configuration with `FORMCRAFT_*` environment overrides.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `FORMCRAFT_DEBOUNCE_MS` | [`EditorConfig::debounce`] | 300 |
//! | `FORMCRAFT_MAX_WAIT_MS` | [`EditorConfig::max_wait`] | 1000 |
//! | `FORMCRAFT_SCROLL_EDGE` | [`EditorConfig::scroll_edge`] | 24 |
//! | `FORMCRAFT_SCROLL_STEP` | [`EditorConfig::scroll_step`] | 12 |
//! | `FORMCRAFT_INDICATOR_THICKNESS` | [`EditorConfig::indicator_thickness`] | 2 |
//! | `FORMCRAFT_CLASS_PREFIX` | [`EditorConfig::class_prefix`] | `fc` |
//!
//! Unset or empty variables keep the default. Anything that does not parse is
//! a [`ConfigError`]; the value is never silently clamped.

use std::env;
use std::fmt;
use std::time::Duration;

use formcraft_layout::{
    AutoScroll, DEFAULT_EDGE_BAND, DEFAULT_INDICATOR_THICKNESS, DEFAULT_SCROLL_STEP,
    ResolverConfig,
};
use formcraft_markup::MarkupRenderer;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(1000);
pub const DEFAULT_CLASS_PREFIX: &str = "fc";

pub const ENV_DEBOUNCE_MS: &str = "FORMCRAFT_DEBOUNCE_MS";
pub const ENV_MAX_WAIT_MS: &str = "FORMCRAFT_MAX_WAIT_MS";
pub const ENV_SCROLL_EDGE: &str = "FORMCRAFT_SCROLL_EDGE";
pub const ENV_SCROLL_STEP: &str = "FORMCRAFT_SCROLL_STEP";
pub const ENV_INDICATOR_THICKNESS: &str = "FORMCRAFT_INDICATOR_THICKNESS";
pub const ENV_CLASS_PREFIX: &str = "FORMCRAFT_CLASS_PREFIX";

/// Tunables for an [`crate::Editor`].
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Quiet period after the last change before markup is regenerated.
    pub debounce: Duration,
    /// Upper bound on how long a pending regeneration may be deferred.
    pub max_wait: Duration,
    pub scroll_edge: f64,
    pub scroll_step: f64,
    pub indicator_thickness: f64,
    /// Prefix for generated class names and element ids.
    pub class_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            max_wait: DEFAULT_MAX_WAIT,
            scroll_edge: DEFAULT_EDGE_BAND,
            scroll_step: DEFAULT_SCROLL_STEP,
            indicator_thickness: DEFAULT_INDICATOR_THICKNESS,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_DEBOUNCE_MS) {
            config.debounce = parse_millis(ENV_DEBOUNCE_MS, &raw)?;
        }
        if let Some(raw) = get(ENV_MAX_WAIT_MS) {
            config.max_wait = parse_millis(ENV_MAX_WAIT_MS, &raw)?;
        }
        if let Some(raw) = get(ENV_SCROLL_EDGE) {
            config.scroll_edge = parse_length(ENV_SCROLL_EDGE, &raw)?;
        }
        if let Some(raw) = get(ENV_SCROLL_STEP) {
            config.scroll_step = parse_length(ENV_SCROLL_STEP, &raw)?;
        }
        if let Some(raw) = get(ENV_INDICATOR_THICKNESS) {
            config.indicator_thickness = parse_length(ENV_INDICATOR_THICKNESS, &raw)?;
        }
        if let Some(raw) = get(ENV_CLASS_PREFIX) {
            config.class_prefix = parse_prefix(ENV_CLASS_PREFIX, raw.trim())?;
        }
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, edge: f64, step: f64) -> Self {
        self.scroll_edge = edge;
        self.scroll_step = step;
        self
    }

    #[must_use]
    pub fn with_indicator_thickness(mut self, thickness: f64) -> Self {
        self.indicator_thickness = thickness;
        self
    }

    #[must_use]
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Cross-field checks. `max_wait` shorter than `debounce` is rejected
    /// since the debounce would never be observed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_wait < self.debounce {
            return Err(ConfigError::MaxWaitBelowDebounce {
                debounce: self.debounce,
                max_wait: self.max_wait,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            indicator_thickness: self.indicator_thickness,
        }
    }

    #[must_use]
    pub fn auto_scroll(&self) -> AutoScroll {
        AutoScroll::new(self.scroll_edge, self.scroll_step)
    }

    #[must_use]
    pub fn renderer(&self) -> MarkupRenderer {
        MarkupRenderer::new().with_class_prefix(self.class_prefix.clone())
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "a whole number of milliseconds",
        })
}

fn parse_length(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "a finite, non-negative length",
        }),
    }
}

fn parse_prefix(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let valid = raw
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(raw.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            expected: "an identifier of ASCII letters, digits, '-' or '_'",
        })
    }
}

/// Error building an [`EditorConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    MaxWaitBelowDebounce {
        debounce: Duration,
        max_wait: Duration,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "{key}={value:?} is invalid: expected {expected}"),
            Self::MaxWaitBelowDebounce { debounce, max_wait } => write!(
                f,
                "max wait ({} ms) must not be shorter than debounce ({} ms)",
                max_wait.as_millis(),
                debounce.as_millis()
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
