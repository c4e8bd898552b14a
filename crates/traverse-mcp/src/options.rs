//! Options builder
//!
//! Starts from the configured default record, applies every generic override
//! present in the call's arguments, then normalizes the merged record.

use traverse_core::{ActionOptions, Arguments, OptionLimits};

use crate::args::optional;
use crate::error::ParameterError;

/// How an override writes into [`ActionOptions`]
enum Setter {
    Flag(fn(&mut ActionOptions) -> &mut bool),
    Seconds(fn(&mut ActionOptions) -> &mut f64),
}

struct Override {
    key: &'static str,
    setter: Setter,
}

/// Generic overrides accepted by every tool
const OVERRIDES: &[Override] = &[
    Override {
        key: "traverseBefore",
        setter: Setter::Flag(|o| &mut o.traverse_before),
    },
    Override {
        key: "traverseAfter",
        setter: Setter::Flag(|o| &mut o.traverse_after),
    },
    Override {
        key: "showDiff",
        setter: Setter::Flag(|o| &mut o.show_diff),
    },
    Override {
        key: "onlyVisibleElements",
        setter: Setter::Flag(|o| &mut o.only_visible_elements),
    },
    Override {
        key: "showAnimation",
        setter: Setter::Flag(|o| &mut o.show_animation),
    },
    Override {
        key: "animationDuration",
        setter: Setter::Seconds(|o| &mut o.animation_duration),
    },
    Override {
        key: "delayAfterAction",
        setter: Setter::Seconds(|o| &mut o.delay_after_action),
    },
];

/// Keys of the generic overrides, in table order
pub fn override_keys() -> impl Iterator<Item = &'static str> {
    OVERRIDES.iter().map(|o| o.key)
}

/// Builds [`ActionOptions`] for a call
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    defaults: ActionOptions,
    limits: OptionLimits,
}

impl OptionsBuilder {
    pub fn new(defaults: ActionOptions, limits: OptionLimits) -> Self {
        Self { defaults, limits }
    }

    /// Merge overrides from `args` onto the defaults and normalize.
    ///
    /// `pid` becomes the traversal target; a present override always wins
    /// over the default for its field.
    pub fn build(&self, args: &Arguments, pid: Option<i32>) -> Result<ActionOptions, ParameterError> {
        let mut options = ActionOptions {
            pid_for_traversal: pid,
            ..self.defaults.clone()
        };

        for o in OVERRIDES {
            match o.setter {
                Setter::Flag(field) => {
                    if let Some(v) = optional::<bool>(args, o.key)? {
                        *field(&mut options) = v;
                    }
                }
                Setter::Seconds(field) => {
                    if let Some(v) = optional::<f64>(args, o.key)? {
                        *field(&mut options) = v;
                    }
                }
            }
        }

        Ok(options.normalized(&self.limits)?)
    }
}
