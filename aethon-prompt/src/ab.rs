//! Weighted A/B selection between labeled prompt variants.

use std::collections::HashMap;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PromptError, Result};
use crate::store::PRODUCTION_LABEL;

/// Name of the built-in personality test.
pub const DEFAULT_TEST: &str = "aethon-personality";

/// Weight tolerance: weights must sum to 1 within this margin.
const WEIGHT_TOLERANCE: f64 = 1e-3;

/// Configuration for a single A/B test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestConfig {
    /// Whether selection draws from the variants or short-circuits to
    /// production.
    pub enabled: bool,
    /// Variant labels to draw between.
    pub variants: Vec<String>,
    /// Selection probability per variant, summing to 1.
    pub weights: Vec<f64>,
    /// Free-form description for status reporting.
    pub description: Option<String>,
}

impl AbTestConfig {
    /// Create a validated test configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidConfig`] if `variants` is empty, the
    /// lengths differ, a weight is negative or non-finite, or the weights
    /// do not sum to 1.
    pub fn new(enabled: bool, variants: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        if variants.is_empty() {
            return Err(PromptError::InvalidConfig("at least one variant is required".into()));
        }
        if variants.len() != weights.len() {
            return Err(PromptError::InvalidConfig(format!(
                "{} variants but {} weights",
                variants.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PromptError::InvalidConfig(
                "weights must be finite and non-negative".into(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(PromptError::InvalidConfig(format!("weights sum to {total}, expected 1.0")));
        }
        Ok(Self { enabled, variants, weights, description: None })
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// A two-variant `prod-a`/`prod-b` split sending `split` of traffic
    /// to `prod-b`.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidConfig`] if `split` is outside [0, 1].
    pub fn split(enabled: bool, split: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&split) {
            return Err(PromptError::InvalidConfig(format!(
                "split must be within [0, 1], got {split}"
            )));
        }
        Self::new(
            enabled,
            vec!["prod-a".to_string(), "prod-b".to_string()],
            vec![1.0 - split, split],
        )
    }
}

/// Status of one A/B test, shaped for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestStatus {
    /// The test's name.
    pub test_name: String,
    /// Whether the test is live.
    pub enabled: bool,
    /// Variant labels.
    pub variants: Vec<String>,
    /// Selection weights.
    pub weights: Vec<f64>,
    /// Optional description.
    pub description: Option<String>,
}

/// Manages A/B tests and performs weighted variant selection.
///
/// Selection never fails: an unknown or disabled test resolves to the
/// production label.
#[derive(Debug, Clone, Default)]
pub struct AbTestManager {
    tests: HashMap<String, AbTestConfig>,
}

impl AbTestManager {
    /// Create a manager with no tests configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with the built-in personality test configured
    /// from `AB_TESTING_ENABLED` and `AB_TESTING_SPLIT`. Unset variables
    /// default to disabled and a 10% split.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::InvalidConfig`] if `AB_TESTING_SPLIT` is
    /// set but not a number in [0, 1].
    pub fn from_env() -> Result<Self> {
        let enabled = std::env::var("AB_TESTING_ENABLED")
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let split = match std::env::var("AB_TESTING_SPLIT") {
            Ok(value) => value.parse::<f64>().map_err(|_| {
                PromptError::InvalidConfig(format!(
                    "AB_TESTING_SPLIT must be a number, got '{value}'"
                ))
            })?,
            Err(_) => 0.1,
        };

        let mut manager = Self::new();
        let state = if enabled { "enabled" } else { "disabled" };
        manager.add_test(
            DEFAULT_TEST,
            AbTestConfig::split(enabled, split)?
                .with_description(format!("Aethon personality A/B test ({state} via env)")),
        );
        Ok(manager)
    }

    /// Add or replace a test configuration.
    pub fn add_test(&mut self, name: impl Into<String>, config: AbTestConfig) {
        let name = name.into();
        info!(test = %name, variants = ?config.variants, "A/B test configured");
        self.tests.insert(name, config);
    }

    /// Enable or disable a test.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnknownTest`] if no test has that name.
    pub fn toggle(&mut self, name: &str, enabled: bool) -> Result<()> {
        let config =
            self.tests.get_mut(name).ok_or_else(|| PromptError::UnknownTest(name.to_string()))?;
        config.enabled = enabled;
        info!(test = %name, enabled, "A/B test toggled");
        Ok(())
    }

    /// Select a variant label for `test` by weighted random draw.
    pub fn select_variant(&self, test: &str) -> String {
        self.select_variant_with(test, &mut rand::thread_rng())
    }

    /// Like [`select_variant`](AbTestManager::select_variant) with a
    /// caller-supplied source of randomness.
    pub fn select_variant_with<R: Rng + ?Sized>(&self, test: &str, rng: &mut R) -> String {
        let Some(config) = self.tests.get(test) else {
            debug!(test, "unknown A/B test, using production");
            return PRODUCTION_LABEL.to_string();
        };
        if !config.enabled {
            return PRODUCTION_LABEL.to_string();
        }

        match WeightedIndex::new(&config.weights) {
            Ok(distribution) => {
                let selected = config.variants[distribution.sample(rng)].clone();
                debug!(test, variant = %selected, "A/B variant selected");
                selected
            }
            Err(e) => {
                // unreachable with validated configs
                warn!(test, error = %e, "degenerate weights, using production");
                PRODUCTION_LABEL.to_string()
            }
        }
    }

    /// Status of a single test.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::UnknownTest`] if no test has that name.
    pub fn status(&self, name: &str) -> Result<AbTestStatus> {
        let config =
            self.tests.get(name).ok_or_else(|| PromptError::UnknownTest(name.to_string()))?;
        Ok(status_of(name, config))
    }

    /// Status of every configured test, sorted by name.
    pub fn status_all(&self) -> Vec<AbTestStatus> {
        let mut statuses: Vec<AbTestStatus> =
            self.tests.iter().map(|(name, config)| status_of(name, config)).collect();
        statuses.sort_by(|a, b| a.test_name.cmp(&b.test_name));
        statuses
    }

    /// Names of the configured tests, sorted.
    pub fn test_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tests.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn status_of(name: &str, config: &AbTestConfig) -> AbTestStatus {
    AbTestStatus {
        test_name: name.to_string(),
        enabled: config.enabled,
        variants: config.variants.clone(),
        weights: config.weights.clone(),
        description: config.description.clone(),
    }
}
