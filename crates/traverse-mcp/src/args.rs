//! Argument extraction
//!
//! Pulls typed scalars out of a call's [`Arguments`]. Required getters fail on
//! a missing key; optional getters treat a missing key and an explicit `null`
//! the same way. Numbers coerce in one direction only: ints widen to floats,
//! and floats narrow to ints only when they are exact.

use tracing::{debug, warn};
use traverse_core::{Arguments, ModifierFlags, Value};

use crate::error::ParameterError;

/// A type that can be read out of a single argument value
pub trait FromArg: Sized {
    /// Type name used in error messages
    const EXPECTED: &'static str;

    fn from_arg(key: &str, value: &Value) -> Result<Self, ParameterError>;
}

fn wrong_type(key: &str, expected: &'static str, value: &Value) -> ParameterError {
    ParameterError::WrongType {
        key: key.to_string(),
        expected,
        found: value.kind().to_string(),
    }
}

impl FromArg for String {
    const EXPECTED: &'static str = "string";

    fn from_arg(key: &str, value: &Value) -> Result<Self, ParameterError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ParameterError::MissingOrWrongType {
                key: key.to_string(),
                expected: Self::EXPECTED,
            })
    }
}

impl FromArg for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_arg(key: &str, value: &Value) -> Result<Self, ParameterError> {
        value
            .as_bool()
            .ok_or_else(|| wrong_type(key, Self::EXPECTED, value))
    }
}

impl FromArg for f64 {
    const EXPECTED: &'static str = "number";

    fn from_arg(key: &str, value: &Value) -> Result<Self, ParameterError> {
        match value {
            Value::Int(i) => {
                debug!("converting int {} to double for key '{}'", i, key);
                Ok(*i as f64)
            }
            Value::Double(d) => Ok(*d),
            other => Err(wrong_type(key, Self::EXPECTED, other)),
        }
    }
}

impl FromArg for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_arg(key: &str, value: &Value) -> Result<Self, ParameterError> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Double(d) => match exact_i64(*d) {
                Some(i) => {
                    debug!("converting exact double {} to int for key '{}'", d, key);
                    Ok(i)
                }
                None => {
                    warn!("received non-exact double {} for integer key '{}'", d, key);
                    Err(ParameterError::NonExactInteger {
                        key: key.to_string(),
                        value: *d,
                    })
                }
            },
            other => Err(wrong_type(key, Self::EXPECTED, other)),
        }
    }
}

/// `Some` only when `d` is integral and representable as `i64`
fn exact_i64(d: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if d.fract() == 0.0 && d >= -UPPER && d < UPPER {
        Some(d as i64)
    } else {
        None
    }
}

/// Read a required argument
pub fn required<T: FromArg>(args: &Arguments, key: &str) -> Result<T, ParameterError> {
    match args.get(key) {
        Some(value) => T::from_arg(key, value),
        None => Err(ParameterError::MissingOrWrongType {
            key: key.to_string(),
            expected: T::EXPECTED,
        }),
    }
}

/// Read an optional argument; absent and `null` both yield `None`
pub fn optional<T: FromArg>(args: &Arguments, key: &str) -> Result<Option<T>, ParameterError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_arg(key, value).map(Some),
    }
}

/// Read an optional process id, checking it fits the native `pid_t` width
pub fn optional_pid(args: &Arguments, key: &str) -> Result<Option<i32>, ParameterError> {
    let Some(raw) = optional::<i64>(args, key)? else {
        return Ok(None);
    };
    i32::try_from(raw).map(Some).map_err(|_| {
        warn!("pid value {} is out of range for pid_t", raw);
        ParameterError::OutOfRange {
            key: key.to_string(),
            value: raw,
        }
    })
}

/// Parse an array of modifier names into a flag set.
///
/// A missing value or a non-array yields no flags. Non-string elements fail
/// the call; unknown names are skipped with a warning.
pub fn modifier_flags(value: Option<&Value>) -> Result<ModifierFlags, ParameterError> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Ok(ModifierFlags::empty());
    };

    let mut flags = ModifierFlags::empty();
    for item in items {
        let Some(name) = item.as_str() else {
            return Err(ParameterError::WrongType {
                key: "modifierFlags".to_string(),
                expected: "array of strings",
                found: format!("array containing {}", item),
            });
        };
        match ModifierFlags::from_alias(name) {
            Some(flag) => flags |= flag,
            None => warn!("unknown modifier flag '{}', ignoring", name),
        }
    }
    Ok(flags)
}
