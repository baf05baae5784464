//! Single-method host interfaces backed by script functions

use crate::adapter::Adapter;
use crate::error::{Result, ScriptError};
use crate::value::HostValue;
use std::cmp::Ordering;
use std::fmt;

/// Identifies the sole method of a host interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityDescriptor {
    pub name: &'static str,
    pub arity: usize,
}

impl CapabilityDescriptor {
    pub const fn new(name: &'static str, arity: usize) -> Self {
        Self { name, arity }
    }
}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A host interface that script code can implement.
///
/// Implementors wrap an [`Adapter`] built for [`Capability::DESCRIPTOR`] and
/// expose a typed method on top of [`Adapter::invoke`].
pub trait Capability: Sized {
    const DESCRIPTOR: CapabilityDescriptor;

    fn from_adapter(adapter: Adapter) -> Self;
}

/// `run()`; whatever the script returns is ignored.
#[derive(Debug)]
pub struct Runnable(Adapter);

impl Runnable {
    pub fn run(&self) -> Result<()> {
        self.0.invoke_discarding(&[])
    }
}

impl Capability for Runnable {
    const DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor::new("run", 0);

    fn from_adapter(adapter: Adapter) -> Self {
        Self(adapter)
    }
}

/// `call()` returning a value.
#[derive(Debug)]
pub struct Callable(Adapter);

impl Callable {
    pub fn call(&self) -> Result<HostValue> {
        self.0.invoke(&[])
    }
}

impl Capability for Callable {
    const DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor::new("call", 0);

    fn from_adapter(adapter: Adapter) -> Self {
        Self(adapter)
    }
}

/// `apply(value)` returning a value.
#[derive(Debug)]
pub struct Function(Adapter);

impl Function {
    pub fn apply(&self, value: impl Into<HostValue>) -> Result<HostValue> {
        self.0.invoke(&[value.into()])
    }
}

impl Capability for Function {
    const DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor::new("apply", 1);

    fn from_adapter(adapter: Adapter) -> Self {
        Self(adapter)
    }
}

/// `compare(a, b)`; the sign of the returned number gives the ordering.
#[derive(Debug)]
pub struct Comparator(Adapter);

impl Comparator {
    pub fn compare(&self, a: impl Into<HostValue>, b: impl Into<HostValue>) -> Result<Ordering> {
        let result = self.0.invoke(&[a.into(), b.into()])?;
        match result {
            HostValue::Int(i) => Ok(i.cmp(&0)),
            HostValue::Float(f) => f.partial_cmp(&0.0).ok_or_else(|| ScriptError::Coercion {
                expected: "an ordering",
                found: "NaN".to_owned(),
            }),
            other => Err(ScriptError::Coercion {
                expected: "an ordering",
                found: other.type_name().to_owned(),
            }),
        }
    }
}

impl Capability for Comparator {
    const DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor::new("compare", 2);

    fn from_adapter(adapter: Adapter) -> Self {
        Self(adapter)
    }
}
