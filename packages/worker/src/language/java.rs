use std::path::Path;

use super::{Language, LanguageRunner, path_arg};

/// Submissions must declare `public class Main`.
#[derive(Debug, Clone)]
pub struct JavaRunner {
    javac: String,
    java: String,
}

impl JavaRunner {
    pub fn new(javac: &str, java: &str) -> Self {
        Self {
            javac: javac.to_string(),
            java: java.to_string(),
        }
    }
}

impl LanguageRunner for JavaRunner {
    fn language(&self) -> Language {
        Language::Java
    }

    fn source_file(&self) -> &'static str {
        "Main.java"
    }

    fn compile_command(&self, workspace: &Path) -> Option<Vec<String>> {
        Some(vec![
            self.javac.clone(),
            "-encoding".to_string(),
            "UTF-8".to_string(),
            "-d".to_string(),
            workspace.to_string_lossy().to_string(),
            path_arg(workspace, self.source_file()),
        ])
    }

    fn run_command(&self, workspace: &Path) -> Vec<String> {
        vec![
            self.java.clone(),
            "-Xss64m".to_string(),
            "-cp".to_string(),
            workspace.to_string_lossy().to_string(),
            "Main".to_string(),
        ]
    }
}
