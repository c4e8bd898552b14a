//! Execution options accompanying a primary action

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution-time configuration for one action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionOptions {
    /// Process whose UI is traversed; `None` lets the engine resolve it
    pub pid_for_traversal: Option<i32>,
    pub traverse_before: bool,
    pub traverse_after: bool,
    pub show_diff: bool,
    pub only_visible_elements: bool,
    pub show_animation: bool,
    /// Seconds
    pub animation_duration: f64,
    /// Seconds to wait between the action and the after-traversal
    pub delay_after_action: f64,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            pid_for_traversal: None,
            traverse_before: false,
            traverse_after: false,
            show_diff: false,
            only_visible_elements: false,
            show_animation: true,
            animation_duration: 0.8,
            delay_after_action: 0.2,
        }
    }
}

/// Upper bounds the engine accepts for timing fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionLimits {
    pub max_animation_duration: f64,
    pub max_delay_after_action: f64,
}

impl Default for OptionLimits {
    fn default() -> Self {
        Self {
            max_animation_duration: 10.0,
            max_delay_after_action: 30.0,
        }
    }
}

/// An option value outside the engine's domain
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid option '{field}': {reason}")]
pub struct InvalidOption {
    pub field: &'static str,
    pub reason: String,
}

impl ActionOptions {
    /// Validate and clamp after all overrides are merged.
    ///
    /// Durations must be finite and non-negative; anything above the limit is
    /// clamped. A diff needs both snapshots, so `show_diff` turns on both
    /// traversal phases.
    pub fn normalized(mut self, limits: &OptionLimits) -> Result<Self, InvalidOption> {
        self.animation_duration = clamp_seconds(
            "animationDuration",
            self.animation_duration,
            limits.max_animation_duration,
        )?;
        self.delay_after_action = clamp_seconds(
            "delayAfterAction",
            self.delay_after_action,
            limits.max_delay_after_action,
        )?;

        if self.show_diff {
            self.traverse_before = true;
            self.traverse_after = true;
        }

        Ok(self)
    }
}

fn clamp_seconds(field: &'static str, value: f64, max: f64) -> Result<f64, InvalidOption> {
    if !value.is_finite() {
        return Err(InvalidOption {
            field,
            reason: format!("expected a finite number of seconds, got {}", value),
        });
    }
    if value < 0.0 {
        return Err(InvalidOption {
            field,
            reason: format!("must not be negative, got {}", value),
        });
    }
    Ok(value.min(max))
}
