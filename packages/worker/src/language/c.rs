use std::path::Path;

use super::{Language, LanguageRunner, path_arg};

#[derive(Debug, Clone)]
pub struct CRunner {
    compiler: String,
}

impl CRunner {
    pub fn new(compiler: &str) -> Self {
        Self {
            compiler: compiler.to_string(),
        }
    }
}

impl LanguageRunner for CRunner {
    fn language(&self) -> Language {
        Language::C
    }

    fn source_file(&self) -> &'static str {
        "solution.c"
    }

    fn compile_command(&self, workspace: &Path) -> Option<Vec<String>> {
        Some(vec![
            self.compiler.clone(),
            "-std=c11".to_string(),
            "-O2".to_string(),
            "-pipe".to_string(),
            "-o".to_string(),
            path_arg(workspace, "solution"),
            path_arg(workspace, self.source_file()),
            "-lm".to_string(),
        ])
    }

    fn run_command(&self, workspace: &Path) -> Vec<String> {
        vec![path_arg(workspace, "solution")]
    }
}
