use std::path::Path;

use super::{Language, LanguageRunner, path_arg};

/// `input()` reads the next stdin line and yields "" once input runs out,
/// instead of raising `EOFError`.
const STDIN_SHIM: &str = r#"import builtins as _judge_builtins
import sys as _judge_sys


def _judge_input(prompt=""):
    line = _judge_sys.stdin.readline()
    if not line:
        return ""
    return line[:-1] if line.endswith("\n") else line


_judge_builtins.input = _judge_input
del _judge_builtins
"#;

#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: String,
}

impl PythonRunner {
    pub fn new(interpreter: &str) -> Self {
        Self {
            interpreter: interpreter.to_string(),
        }
    }
}

impl LanguageRunner for PythonRunner {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file(&self) -> &'static str {
        "solution.py"
    }

    fn prepare_source(&self, code: &str) -> String {
        // `from __future__` imports must stay the first statements of the module.
        let (future, body): (Vec<&str>, Vec<&str>) = code
            .lines()
            .partition(|line| line.starts_with("from __future__ import"));
        if future.is_empty() {
            return format!("{STDIN_SHIM}\n{code}\n");
        }
        format!("{}\n{STDIN_SHIM}\n{}\n", future.join("\n"), body.join("\n"))
    }

    fn compile_command(&self, _workspace: &Path) -> Option<Vec<String>> {
        None
    }

    fn run_command(&self, workspace: &Path) -> Vec<String> {
        vec![
            self.interpreter.clone(),
            "-u".to_string(),
            path_arg(workspace, self.source_file()),
        ]
    }
}
