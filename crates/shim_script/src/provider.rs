//! Engine lookup by short name

use crate::error::{Result, ScriptError};
use crate::output::ScriptOutput;
use crate::runtime::ScriptEngine;
use tracing::debug;

/// Creates engines for a scripting language.
pub trait EngineProvider {
    /// Canonical name, reported by engines this provider creates.
    fn engine_name(&self) -> &str;

    /// Names the provider answers to. Matched case-insensitively.
    fn names(&self) -> &[&'static str];

    fn create(&self, output: ScriptOutput) -> Result<ScriptEngine>;
}

/// JavaScript through QuickJS.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuickJsProvider;

impl EngineProvider for QuickJsProvider {
    fn engine_name(&self) -> &str {
        "quickjs"
    }

    fn names(&self) -> &[&'static str] {
        &["js", "javascript", "ecmascript", "quickjs"]
    }

    fn create(&self, output: ScriptOutput) -> Result<ScriptEngine> {
        ScriptEngine::new(self.engine_name(), output)
    }
}

/// Registry of engine providers.
pub struct EngineManager {
    providers: Vec<Box<dyn EngineProvider>>,
    output: ScriptOutput,
}

impl EngineManager {
    /// A manager with QuickJS registered, printing to stdout.
    pub fn new() -> Self {
        let mut manager = Self::empty();
        manager.register(QuickJsProvider);
        manager
    }

    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
            output: ScriptOutput::stdout(),
        }
    }

    /// Direct the output of engines created from now on.
    pub fn with_output(mut self, output: ScriptOutput) -> Self {
        self.output = output;
        self
    }

    /// Later registrations win over earlier ones for shared names.
    pub fn register(&mut self, provider: impl EngineProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn engine_by_name(&self, name: &str) -> Result<ScriptEngine> {
        let provider = self
            .providers
            .iter()
            .rev()
            .find(|p| p.names().iter().any(|n| n.eq_ignore_ascii_case(name)))
            .ok_or_else(|| ScriptError::EngineNotFound {
                name: name.to_owned(),
            })?;

        debug!(requested = name, provider = provider.engine_name(), "Resolved engine");
        provider.create(self.output.clone())
    }
}

impl Default for EngineManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_by_name() {
        let manager = EngineManager::new().with_output(ScriptOutput::captured());

        let engine = manager.engine_by_name("js").unwrap();
        assert_eq!(engine.name(), "quickjs");
        assert!(manager.engine_by_name("JavaScript").is_ok());

        match manager.engine_by_name("lua") {
            Err(ScriptError::EngineNotFound { name }) => assert_eq!(name, "lua"),
            other => panic!("unexpected result: {:?}", other.map(|e| e.name().to_owned())),
        }
    }

    #[test]
    fn test_empty_manager_has_no_engines() {
        let manager = EngineManager::empty();
        assert!(matches!(
            manager.engine_by_name("js"),
            Err(ScriptError::EngineNotFound { .. })
        ));
    }

    struct Prelude;

    impl EngineProvider for Prelude {
        fn engine_name(&self) -> &str {
            "js-prelude"
        }

        fn names(&self) -> &[&'static str] {
            &["js"]
        }

        fn create(&self, output: ScriptOutput) -> Result<ScriptEngine> {
            let engine = ScriptEngine::new(self.engine_name(), output)?;
            engine.eval("function run() { print('prelude'); }")?;
            Ok(engine)
        }
    }

    #[test]
    fn test_later_providers_shadow_earlier_ones() {
        let output = ScriptOutput::captured();
        let mut manager = EngineManager::new().with_output(output.clone());
        manager.register(Prelude);

        let engine = manager.engine_by_name("js").unwrap();
        assert_eq!(engine.name(), "js-prelude");
        engine.invoke_function("run", &[]).unwrap();
        assert_eq!(output.lines(), vec!["prelude"]);
    }
}
