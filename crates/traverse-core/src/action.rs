//! Action descriptors
//!
//! Every tool call resolves to exactly one [`PrimaryAction`]. The descriptor is
//! plain data: it is built on the calling task and shipped to the engine
//! thread (or serialized to an out-of-process engine) unchanged.

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Modifier keys held during a key press.
    ///
    /// Bit values match the macOS `CGEventFlags` masks so an engine can pass
    /// `bits()` straight through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u64 {
        const CAPS_LOCK   = 0x0001_0000;
        const SHIFT       = 0x0002_0000;
        const CONTROL     = 0x0004_0000;
        const OPTION      = 0x0008_0000;
        const COMMAND     = 0x0010_0000;
        const NUMERIC_PAD = 0x0020_0000;
        const HELP        = 0x0040_0000;
        const FUNCTION    = 0x0080_0000;
    }
}

impl ModifierFlags {
    /// Resolve a user-facing modifier name, case-insensitively.
    pub fn from_alias(name: &str) -> Option<Self> {
        let flag = match name.to_lowercase().as_str() {
            "capslock" | "caps" => Self::CAPS_LOCK,
            "shift" => Self::SHIFT,
            "control" | "ctrl" => Self::CONTROL,
            "option" | "opt" | "alt" => Self::OPTION,
            "command" | "cmd" => Self::COMMAND,
            "help" => Self::HELP,
            "function" | "fn" => Self::FUNCTION,
            "numericpad" | "numpad" => Self::NUMERIC_PAD,
            _ => return None,
        };
        Some(flag)
    }
}

impl Serialize for ModifierFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_names().map(|(name, _)| name))
    }
}

impl<'de> Deserialize<'de> for ModifierFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(ModifierFlags::empty(), |acc, name| {
            ModifierFlags::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| D::Error::custom(format!("unknown modifier flag: {}", name)))
        })
    }
}

/// Low-level input simulated against the target application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum InputAction {
    Click {
        x: f64,
        y: f64,
    },
    Type {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Press {
        key_name: String,
        flags: ModifierFlags,
    },
}

/// The single automation operation a tool call resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PrimaryAction {
    /// Open or activate an application by name, path, or bundle id
    Open { identifier: String },
    Input { input: InputAction },
    /// No action; only the traversal phases run
    TraverseOnly,
}

impl PrimaryAction {
    pub fn click(x: f64, y: f64) -> Self {
        PrimaryAction::Input {
            input: InputAction::Click { x, y },
        }
    }

    pub fn type_text(text: impl Into<String>) -> Self {
        PrimaryAction::Input {
            input: InputAction::Type { text: text.into() },
        }
    }

    pub fn press(key_name: impl Into<String>, flags: ModifierFlags) -> Self {
        PrimaryAction::Input {
            input: InputAction::Press {
                key_name: key_name.into(),
                flags,
            },
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Open { .. } => "open",
            PrimaryAction::Input { input } => match input {
                InputAction::Click { .. } => "click",
                InputAction::Type { .. } => "type",
                InputAction::Press { .. } => "press",
            },
            PrimaryAction::TraverseOnly => "traverse",
        }
    }
}
