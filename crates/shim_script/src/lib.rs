//! Shim Scripting System
//!
//! Script functions as implementations of host interfaces, on top of
//! JavaScript executed by QuickJS.
//!
//! ## Architecture
//!
//! - **Engines:** looked up by short name through [`EngineManager`]
//! - **Execution context:** a [`ScriptEngine`]'s global bindings
//! - **Adapters:** [`Adapter`] binds a [`CapabilityDescriptor`] (method name +
//!   arity) to a global function or to a member of a [`ScriptObject`]
//! - **Values:** [`HostValue`] with explicit coercion rules, see [`value`]
//!
//! ```no_run
//! use shim_script::{EngineManager, Runnable};
//!
//! # fn main() -> shim_script::Result<()> {
//! let engine = EngineManager::new().engine_by_name("js")?;
//! engine.eval("function run() { print('run1'); }")?;
//! let runnable: Runnable = engine.get_interface()?;
//! runnable.run()?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod capability;
pub mod error;
pub mod handle;
pub mod loader;
pub mod output;
pub mod provider;
pub mod runtime;
pub mod settings;
pub mod value;

pub use adapter::Adapter;
pub use capability::{Callable, Capability, CapabilityDescriptor, Comparator, Function, Runnable};
pub use error::{Result, ScriptError};
pub use handle::ScriptObject;
pub use loader::SourceLoader;
pub use output::ScriptOutput;
pub use provider::{EngineManager, EngineProvider, QuickJsProvider};
pub use runtime::ScriptEngine;
pub use settings::Settings;
pub use value::HostValue;

pub use rquickjs;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
