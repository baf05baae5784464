//! Host-held handles to script objects
//!
//! A handle keeps its object and the owning context alive between entries
//! into the context.

use crate::error::{Result, ScriptError};
use rquickjs::{Context, Ctx, Object, Persistent};
use std::fmt;

/// A script object referenced from the host.
#[derive(Clone)]
pub struct ScriptObject {
    // Released before the context below.
    object: Persistent<Object<'static>>,
    context: Context,
}

impl ScriptObject {
    pub(crate) fn new<'js>(ctx: &Ctx<'js>, context: Context, object: Object<'js>) -> Self {
        Self {
            object: Persistent::save(ctx, object),
            context,
        }
    }

    /// Re-enter the object inside `ctx`. Fails when `ctx` belongs to a
    /// different engine than the one that created the object.
    pub(crate) fn restore<'js>(&self, ctx: &Ctx<'js>) -> Result<Object<'js>> {
        self.object
            .clone()
            .restore(ctx)
            .map_err(|_| ScriptError::ForeignObject)
    }

    /// Whether the object (or its prototype chain) has a property `name`.
    pub fn has_member(&self, name: &str) -> Result<bool> {
        self.context.with(|ctx| {
            let object = self.restore(&ctx)?;
            Ok(object.contains_key(name)?)
        })
    }
}

impl fmt::Debug for ScriptObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject").finish_non_exhaustive()
    }
}
