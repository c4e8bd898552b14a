//! Traverse Core - action model and execution for the traverse MCP server
//!
//! Holds everything that is independent of the wire protocol: the loosely-typed
//! [`Value`] model, action descriptors, execution options, the aggregated
//! [`ActionResult`], the [`Engine`] seam and the [`Executor`] that serializes
//! all engine access onto one thread.

pub mod action;
pub mod engine;
pub mod executor;
pub mod options;
pub mod paths;
pub mod result;
pub mod value;

pub use action::{InputAction, ModifierFlags, PrimaryAction};
pub use engine::{CommandEngine, DryRunEngine, Engine};
pub use executor::{Executor, ExecutorError};
pub use options::{ActionOptions, InvalidOption, OptionLimits};
pub use paths::Paths;
pub use result::ActionResult;
pub use value::{Arguments, Value};
