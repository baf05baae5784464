//! Destination for script `print` output

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
enum Sink {
    Stdout,
    Captured(Vec<String>),
}

/// Where lines printed by scripts end up.
///
/// Cloning shares the sink, so a captured output can be read back by the
/// host after the engine wrote to it.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    sink: Rc<RefCell<Sink>>,
}

impl ScriptOutput {
    pub fn stdout() -> Self {
        Self {
            sink: Rc::new(RefCell::new(Sink::Stdout)),
        }
    }

    /// Keep printed lines in memory instead of writing them out.
    pub fn captured() -> Self {
        Self {
            sink: Rc::new(RefCell::new(Sink::Captured(Vec::new()))),
        }
    }

    pub fn write_line(&self, line: &str) {
        match &mut *self.sink.borrow_mut() {
            Sink::Stdout => println!("{}", line),
            Sink::Captured(lines) => lines.push(line.to_owned()),
        }
    }

    /// Lines captured so far. Always empty for stdout.
    pub fn lines(&self) -> Vec<String> {
        match &*self.sink.borrow() {
            Sink::Stdout => Vec::new(),
            Sink::Captured(lines) => lines.clone(),
        }
    }

    /// Drain the captured lines.
    pub fn take(&self) -> Vec<String> {
        match &mut *self.sink.borrow_mut() {
            Sink::Stdout => Vec::new(),
            Sink::Captured(lines) => std::mem::take(lines),
        }
    }
}

impl Default for ScriptOutput {
    fn default() -> Self {
        Self::stdout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_output_is_shared() {
        let output = ScriptOutput::captured();
        let writer = output.clone();
        writer.write_line("run1");
        writer.write_line("run2");

        assert_eq!(output.lines(), vec!["run1", "run2"]);
        assert_eq!(output.take(), vec!["run1", "run2"]);
        assert!(output.lines().is_empty());
    }
}
