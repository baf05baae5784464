//! Shim Runtime
//!
//! Evaluates the configured script and calls it through host interfaces,
//! once via a global function and once via a script object's member.

use anyhow::{Context, Result};
use shim_script::{EngineManager, Runnable, Settings, SourceLoader};

/// Script object whose `run` member backs the scoped adapter.
const SCOPED_OBJECT: &str = "intfObj";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Shim v{}", shim_script::VERSION);
    println!("\nInterface adapter\n");

    let settings = Settings::from_env().context("loading settings")?;
    run(&settings, &EngineManager::new())
}

fn run(settings: &Settings, manager: &EngineManager) -> Result<()> {
    let engine = manager
        .engine_by_name(&settings.engine)
        .with_context(|| format!("loading script engine '{}'", settings.engine))?;

    let loader = SourceLoader::from_settings(settings);
    let path = loader.resolve(&settings.script);
    let source = loader
        .load(&path)
        .with_context(|| format!("loading script {}", path.display()))?;
    engine
        .eval(&source)
        .with_context(|| format!("evaluating {}", path.display()))?;

    let run1: Runnable = engine.get_interface().context("adapting global run()")?;
    run1.run()?;

    // Same contract, resolved against one object only
    let intf_obj = engine.get_object(SCOPED_OBJECT)?;
    let run2: Runnable = engine
        .get_interface_of(&intf_obj)
        .with_context(|| format!("adapting {SCOPED_OBJECT}.run()"))?;
    run2.run()?;

    tracing::info!(engine = engine.name(), "Scenario complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shim_script::{ScriptError, ScriptOutput};
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            script_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scripts"),
            ..Settings::default()
        }
    }

    #[test]
    fn test_bundled_script_prints_both_runs() {
        let output = ScriptOutput::captured();
        let manager = EngineManager::new().with_output(output.clone());

        run(&settings(), &manager).unwrap();
        assert_eq!(output.lines(), vec!["run1", "run2"]);
    }

    #[test]
    fn test_unknown_engine_fails() {
        let settings = Settings {
            engine: "nashorn".to_owned(),
            ..settings()
        };
        let err = run(&settings, &EngineManager::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::EngineNotFound { .. })
        ));
    }

    #[test]
    fn test_script_without_scoped_object_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("only_global.js"), "function run() { print('run1'); }")
            .unwrap();
        let settings = Settings {
            script_dir: dir.path().to_path_buf(),
            script: "only_global.js".to_owned(),
            ..Settings::default()
        };
        let output = ScriptOutput::captured();
        let manager = EngineManager::new().with_output(output.clone());

        let err = run(&settings, &manager).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::UnknownBinding { .. })
        ));
        assert_eq!(output.lines(), vec!["run1"]);
    }

    #[test]
    fn test_missing_script_names_its_path() {
        let settings = Settings {
            script: "missing.js".to_owned(),
            ..settings()
        };
        let err = run(&settings, &EngineManager::new()).unwrap_err();

        assert!(err.to_string().starts_with("loading script "), "{err}");
        assert!(err.to_string().ends_with("missing.js"), "{err}");
        assert!(matches!(
            err.downcast_ref::<ScriptError>(),
            Some(ScriptError::Io { .. })
        ));
    }
}
