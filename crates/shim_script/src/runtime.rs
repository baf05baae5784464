//! Script engine management
//!
//! One QuickJS runtime and context per engine. The context's globals are the
//! execution context that adapters and direct calls resolve against.

use crate::adapter::{self, Adapter};
use crate::capability::Capability;
use crate::error::{Result, ScriptError};
use crate::handle::ScriptObject;
use crate::output::ScriptOutput;
use crate::value::{self, HostValue};
use rquickjs::convert::Coerced;
use rquickjs::function::Rest;
use rquickjs::{CatchResultExt, Context, Ctx, Function, Object, Runtime, Value};
use tracing::{debug, info};

/// Script execution context
pub struct ScriptEngine {
    name: String,
    context: Context,
    output: ScriptOutput,
}

impl ScriptEngine {
    /// Create an engine whose `print` and `console.log` write to `output`.
    pub fn new(name: impl Into<String>, output: ScriptOutput) -> Result<Self> {
        let runtime = Runtime::new()?;
        // The context keeps its runtime alive.
        let context = Context::full(&runtime)?;
        context.with(|ctx| install_print(&ctx, &output))?;

        let name = name.into();
        info!(engine = %name, "Script engine created");
        Ok(Self {
            name,
            context,
            output,
        })
    }

    /// Name of the provider that created this engine.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> &ScriptOutput {
        &self.output
    }

    pub(crate) fn context(&self) -> &Context {
        &self.context
    }

    /// Evaluate `source` for its effect on the global bindings.
    pub fn eval(&self, source: &str) -> Result<()> {
        debug!(engine = %self.name, bytes = source.len(), "Evaluating script");
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .catch(&ctx)
                .map_err(|e| ScriptError::Evaluation {
                    message: e.to_string(),
                })
        })
    }

    /// Evaluate `source` and return its completion value.
    pub fn eval_value(&self, source: &str) -> Result<HostValue> {
        debug!(engine = %self.name, bytes = source.len(), "Evaluating expression");
        self.context.with(|ctx| {
            let value: Value = ctx
                .eval(source)
                .catch(&ctx)
                .map_err(|e| ScriptError::Evaluation {
                    message: e.to_string(),
                })?;
            value::from_js(&ctx, &value)
        })
    }

    /// Read a global binding. Missing bindings read as `Undefined`.
    pub fn get(&self, name: &str) -> Result<HostValue> {
        self.context.with(|ctx| {
            let value: Value = value::caught(&ctx, ctx.globals().get(name))?;
            value::from_js(&ctx, &value)
        })
    }

    pub fn put(&self, name: &str, value: impl Into<HostValue>) -> Result<()> {
        let value = value.into();
        self.context.with(|ctx| {
            let value = value::to_js(&ctx, &value)?;
            ctx.globals().set(name, value)?;
            Ok(())
        })
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        self.context
            .with(|ctx| Ok(ctx.globals().contains_key(name)?))
    }

    /// Take a handle to the object bound to global `name`.
    pub fn get_object(&self, name: &str) -> Result<ScriptObject> {
        self.context.with(|ctx| {
            let globals = ctx.globals();
            if !globals.contains_key(name)? {
                return Err(ScriptError::UnknownBinding {
                    name: name.to_owned(),
                });
            }
            let value: Value = value::caught(&ctx, globals.get(name))?;
            let found = value::type_name(&value);
            let object = value.into_object().ok_or(ScriptError::Coercion {
                expected: "a script object",
                found,
            })?;
            Ok(ScriptObject::new(&ctx, self.context.clone(), object))
        })
    }

    /// Call the global function `name`.
    pub fn invoke_function(&self, name: &str, args: &[HostValue]) -> Result<HostValue> {
        debug!(engine = %self.name, function = name, args = args.len(), "Invoking function");
        self.context.with(|ctx| {
            let function = member_function(&ctx, &ctx.globals(), name)?;
            adapter::call(&ctx, &function, None, name, args, true)
        })
    }

    /// Call method `name` of `object` with the object as `this`.
    pub fn invoke_method(
        &self,
        object: &ScriptObject,
        name: &str,
        args: &[HostValue],
    ) -> Result<HostValue> {
        debug!(engine = %self.name, method = name, args = args.len(), "Invoking method");
        self.context.with(|ctx| {
            let this = object.restore(&ctx)?;
            let function = member_function(&ctx, &this, name)?;
            adapter::call(&ctx, &function, Some(this), name, args, true)
        })
    }

    /// Implement `C` with the global function named after its method.
    pub fn get_interface<C: Capability>(&self) -> Result<C> {
        Adapter::global(self, C::DESCRIPTOR).map(C::from_adapter)
    }

    /// Implement `C` with the member of `object` named after its method.
    pub fn get_interface_of<C: Capability>(&self, object: &ScriptObject) -> Result<C> {
        Adapter::scoped(self, object, C::DESCRIPTOR).map(C::from_adapter)
    }
}

fn member_function<'js>(ctx: &Ctx<'js>, holder: &Object<'js>, name: &str) -> Result<Function<'js>> {
    let value: Value = holder
        .get(name)
        .catch(ctx)
        .map_err(|e| ScriptError::Invocation {
            method: name.to_owned(),
            message: e.to_string(),
        })?;
    value.into_function().ok_or_else(|| ScriptError::NoSuchMethod {
        name: name.to_owned(),
    })
}

/// Install `print(...)` and `console.log(...)`. Arguments are converted with
/// the script's own string conversion and joined with single spaces.
fn install_print(ctx: &Ctx<'_>, output: &ScriptOutput) -> rquickjs::Result<()> {
    let sink = output.clone();
    let print = Function::new(ctx.clone(), move |args: Rest<Coerced<String>>| {
        let line = args
            .0
            .into_iter()
            .map(|arg| arg.0)
            .collect::<Vec<_>>()
            .join(" ");
        sink.write_line(&line);
    })?;

    let console = Object::new(ctx.clone())?;
    console.set("log", print.clone())?;

    let globals = ctx.globals();
    globals.set("print", print)?;
    globals.set("console", console)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScriptEngine {
        ScriptEngine::new("js", ScriptOutput::captured()).unwrap()
    }

    #[test]
    fn test_print_joins_arguments() {
        let engine = engine();
        engine
            .eval(r#"print("a", 1, true, null); console.log("b");"#)
            .unwrap();
        assert_eq!(engine.output().lines(), vec!["a 1 true null", "b"]);
    }

    #[test]
    fn test_eval_errors_carry_the_script_message() {
        let engine = engine();
        let err = engine.eval("throw new Error('boom')").unwrap_err();
        match err {
            ScriptError::Evaluation { message } => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = engine.eval("function (").unwrap_err();
        assert!(matches!(err, ScriptError::Evaluation { .. }));
    }

    #[test]
    fn test_eval_tolerates_function_completion_values() {
        let engine = engine();
        engine.eval("intfObj = { run: function () {} }").unwrap();
        assert!(engine.contains("intfObj").unwrap());
    }

    #[test]
    fn test_get_and_put_bindings() {
        let engine = engine();
        engine.put("limit", 10).unwrap();
        engine.eval("var doubled = limit * 2;").unwrap();

        assert_eq!(engine.get("doubled").unwrap(), HostValue::Int(20));
        assert_eq!(engine.get("missing").unwrap(), HostValue::Undefined);
        assert_eq!(
            engine.eval_value("[limit, 'x']").unwrap(),
            HostValue::from(vec![HostValue::Int(10), HostValue::from("x")])
        );
    }

    #[test]
    fn test_get_object() {
        let engine = engine();
        engine.eval("var obj = { run() {} }; var n = 1;").unwrap();

        let obj = engine.get_object("obj").unwrap();
        assert!(obj.has_member("run").unwrap());
        assert!(!obj.has_member("stop").unwrap());

        assert!(matches!(
            engine.get_object("nope").unwrap_err(),
            ScriptError::UnknownBinding { .. }
        ));
        assert!(matches!(
            engine.get_object("n").unwrap_err(),
            ScriptError::Coercion { .. }
        ));
    }

    #[test]
    fn test_invoke_function_and_method() {
        let engine = engine();
        engine
            .eval(
                r#"
                function add(a, b) { return a + b; }
                var counter = { count: 5, bump(by) { this.count += by; return this.count; } };
                "#,
            )
            .unwrap();

        let sum = engine
            .invoke_function("add", &[HostValue::Int(2), HostValue::Int(3)])
            .unwrap();
        assert_eq!(sum, HostValue::Int(5));

        let counter = engine.get_object("counter").unwrap();
        let count = engine
            .invoke_method(&counter, "bump", &[HostValue::Int(2)])
            .unwrap();
        assert_eq!(count, HostValue::Int(7));

        assert!(matches!(
            engine.invoke_function("subtract", &[]).unwrap_err(),
            ScriptError::NoSuchMethod { .. }
        ));
    }

    #[test]
    fn test_objects_from_other_engines_are_rejected() {
        let first = engine();
        let second = engine();
        first.eval("var obj = { run() {} };").unwrap();
        let obj = first.get_object("obj").unwrap();

        assert!(matches!(
            second.invoke_method(&obj, "run", &[]).unwrap_err(),
            ScriptError::ForeignObject
        ));
    }

    #[test]
    fn test_throwing_method_lookup_keeps_its_message() {
        let engine = engine();
        engine
            .eval("var o = { get bump() { throw new Error('getter boom'); } };")
            .unwrap();
        let o = engine.get_object("o").unwrap();

        match engine.invoke_method(&o, "bump", &[]).unwrap_err() {
            ScriptError::Invocation { method, message } => {
                assert_eq!(method, "bump");
                assert!(message.contains("getter boom"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
