//! Interface adapter
//!
//! Turns a script function into the implementation of a single-method host
//! interface. The function is looked up by the interface's method name,
//! either among the engine's globals or among the members of one script
//! object. Lookup happens when the adapter is built, so a missing function
//! fails early, and again on every call, so the adapter always invokes what
//! the binding currently holds.

use crate::capability::CapabilityDescriptor;
use crate::error::{Result, ScriptError};
use crate::handle::ScriptObject;
use crate::runtime::ScriptEngine;
use crate::value::{self, HostValue};
use rquickjs::function::{Rest, This};
use rquickjs::{CatchResultExt, Context, Ctx, Function, Object, Value};
use std::fmt;
use tracing::{debug, warn};

enum Target {
    Global,
    Member(ScriptObject),
}

impl Target {
    fn scope(&self) -> &'static str {
        match self {
            Target::Global => "global",
            Target::Member(_) => "object",
        }
    }
}

/// A script function standing in for the method of a host interface.
pub struct Adapter {
    descriptor: CapabilityDescriptor,
    target: Target,
    context: Context,
}

impl Adapter {
    /// Adapt the global function named after `descriptor`'s method.
    pub fn global(engine: &ScriptEngine, descriptor: CapabilityDescriptor) -> Result<Self> {
        Self::bind(engine, Target::Global, descriptor)
    }

    /// Adapt the member of `object` named after `descriptor`'s method. Global
    /// functions of the same name are never considered.
    pub fn scoped(
        engine: &ScriptEngine,
        object: &ScriptObject,
        descriptor: CapabilityDescriptor,
    ) -> Result<Self> {
        Self::bind(engine, Target::Member(object.clone()), descriptor)
    }

    fn bind(engine: &ScriptEngine, target: Target, descriptor: CapabilityDescriptor) -> Result<Self> {
        let context = engine.context().clone();
        context
            .with(|ctx| resolve(&ctx, &target, descriptor).map(drop))
            .inspect_err(|e| warn!(capability = %descriptor, error = %e, "Adaptation rejected"))?;

        debug!(capability = %descriptor, scope = target.scope(), "Adapted script function");
        Ok(Self {
            descriptor,
            target,
            context,
        })
    }

    pub fn descriptor(&self) -> CapabilityDescriptor {
        self.descriptor
    }

    /// Call the script function with `args` and return its result.
    pub fn invoke(&self, args: &[HostValue]) -> Result<HostValue> {
        self.dispatch(args, true)
    }

    /// Call the script function and ignore its result.
    pub fn invoke_discarding(&self, args: &[HostValue]) -> Result<()> {
        self.dispatch(args, false).map(drop)
    }

    fn dispatch(&self, args: &[HostValue], coerce_result: bool) -> Result<HostValue> {
        let method = self.descriptor.name;
        if args.len() != self.descriptor.arity {
            return Err(ScriptError::Invocation {
                method: method.to_owned(),
                message: format!(
                    "expected {} argument(s), got {}",
                    self.descriptor.arity,
                    args.len()
                ),
            });
        }

        debug!(capability = %self.descriptor, scope = self.target.scope(), "Invoking adapter");
        self.context.with(|ctx| {
            let (function, this) = resolve(&ctx, &self.target, self.descriptor)?;
            call(&ctx, &function, this, method, args, coerce_result)
        })
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("descriptor", &self.descriptor)
            .field("scope", &self.target.scope())
            .finish()
    }
}

/// Find the function implementing `descriptor`, plus the `this` to call it with.
fn resolve<'js>(
    ctx: &Ctx<'js>,
    target: &Target,
    descriptor: CapabilityDescriptor,
) -> Result<(Function<'js>, Option<Object<'js>>)> {
    let unsupported = |reason: String| ScriptError::UnsupportedCapability {
        capability: descriptor.to_string(),
        scope: target.scope(),
        reason,
    };

    let (holder, this) = match target {
        Target::Global => (ctx.globals(), None),
        Target::Member(object) => {
            let object = object
                .restore(ctx)
                .map_err(|_| unsupported("object is not backed by this engine".to_owned()))?;
            (object.clone(), Some(object))
        }
    };

    let value: Value = holder.get(descriptor.name).catch(ctx).map_err(|e| {
        unsupported(format!("looking up '{}' threw: {e}", descriptor.name))
    })?;
    if value.is_undefined() {
        return Err(unsupported(format!("no binding named '{}'", descriptor.name)));
    }
    let found = value::type_name(&value);
    let function = value
        .into_function()
        .ok_or_else(|| unsupported(format!("'{}' is a {found}, not a function", descriptor.name)))?;
    Ok((function, this))
}

/// Call `function` with host arguments. Exceptions thrown by the script,
/// including those thrown while reading its result, surface as
/// [`ScriptError::Invocation`].
pub(crate) fn call<'js>(
    ctx: &Ctx<'js>,
    function: &Function<'js>,
    this: Option<Object<'js>>,
    method: &str,
    args: &[HostValue],
    coerce_result: bool,
) -> Result<HostValue> {
    let args = args
        .iter()
        .map(|arg| value::to_js(ctx, arg))
        .collect::<Result<Vec<_>>>()?;

    let result: rquickjs::Result<Value<'js>> = match this {
        Some(this) => function.call((This(this), Rest(args))),
        None => function.call((Rest(args),)),
    };
    let result = result.catch(ctx).map_err(|e| ScriptError::Invocation {
        method: method.to_owned(),
        message: e.to_string(),
    })?;

    if coerce_result {
        value::from_js(ctx, &result).map_err(|e| match e {
            ScriptError::Exception { message } => ScriptError::Invocation {
                method: method.to_owned(),
                message,
            },
            other => other,
        })
    } else {
        Ok(HostValue::Undefined)
    }
}
