use std::path::Path;

use super::{Language, LanguageRunner, path_arg};

#[derive(Debug, Clone)]
pub struct CppRunner {
    compiler: String,
}

impl CppRunner {
    pub fn new(compiler: &str) -> Self {
        Self {
            compiler: compiler.to_string(),
        }
    }
}

impl LanguageRunner for CppRunner {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file(&self) -> &'static str {
        "solution.cpp"
    }

    fn compile_command(&self, workspace: &Path) -> Option<Vec<String>> {
        Some(vec![
            self.compiler.clone(),
            "-std=c++17".to_string(),
            "-O2".to_string(),
            "-pipe".to_string(),
            "-o".to_string(),
            path_arg(workspace, "solution"),
            path_arg(workspace, self.source_file()),
        ])
    }

    fn run_command(&self, workspace: &Path) -> Vec<String> {
        vec![path_arg(workspace, "solution")]
    }
}
