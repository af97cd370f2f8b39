use std::path::Path;

use super::{Language, LanguageRunner, path_arg};

/// Global `input()` / `prompt()` returning successive stdin lines, then "".
/// Stdin is only slurped on first use so `readline`-based programs still see it.
const STDIN_SHIM: &str = r#"let __judgeLines = null;
let __judgeCursor = 0;
globalThis.input = globalThis.prompt = function () {
  if (__judgeLines === null) {
    try {
      __judgeLines = require("fs").readFileSync(0, "utf8").split(/\r?\n/);
    } catch (_) {
      __judgeLines = [];
    }
    if (__judgeLines.length > 0 && __judgeLines[__judgeLines.length - 1] === "") {
      __judgeLines.pop();
    }
  }
  return __judgeCursor < __judgeLines.length ? __judgeLines[__judgeCursor++] : "";
};
"#;

#[derive(Debug, Clone)]
pub struct JavaScriptRunner {
    node: String,
}

impl JavaScriptRunner {
    pub fn new(node: &str) -> Self {
        Self {
            node: node.to_string(),
        }
    }
}

impl LanguageRunner for JavaScriptRunner {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn source_file(&self) -> &'static str {
        "solution.js"
    }

    fn prepare_source(&self, code: &str) -> String {
        format!("{STDIN_SHIM}\n{code}\n")
    }

    fn compile_command(&self, _workspace: &Path) -> Option<Vec<String>> {
        None
    }

    fn run_command(&self, workspace: &Path) -> Vec<String> {
        vec![self.node.clone(), path_arg(workspace, self.source_file())]
    }
}
