mod c;
mod cpp;
mod java;
mod javascript;
mod python;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::ToolchainConfig;

pub use c::CRunner;
pub use cpp::CppRunner;
pub use java::JavaRunner;
pub use javascript::JavaScriptRunner;
pub use python::PythonRunner;

/// The closed set of languages the dispatcher knows how to build and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Self::C,
        Self::Cpp,
        Self::Java,
        Self::Python,
        Self::JavaScript,
    ];

    /// Canonical tag stored on submissions and contest allowlists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::Python => "python",
            Self::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a language tag outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnsupportedLanguage {}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(Self::C),
            "cpp" | "c++" | "cxx" | "cc" => Ok(Self::Cpp),
            "java" => Ok(Self::Java),
            "python" | "python3" | "py" => Ok(Self::Python),
            "javascript" | "js" | "node" | "nodejs" => Ok(Self::JavaScript),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Language-specific build and launch recipe.
///
/// Commands are full argv vectors rooted in the execution workspace.
pub trait LanguageRunner: Send + Sync {
    fn language(&self) -> Language;

    /// File name the submitted code is written to.
    fn source_file(&self) -> &'static str;

    /// Final source text. Interpreted languages prepend their stdin shim here.
    fn prepare_source(&self, code: &str) -> String {
        code.to_string()
    }

    /// `None` for languages without a build step.
    fn compile_command(&self, workspace: &Path) -> Option<Vec<String>>;

    fn run_command(&self, workspace: &Path) -> Vec<String>;
}

pub fn runner_for(language: Language, toolchain: &ToolchainConfig) -> Box<dyn LanguageRunner> {
    match language {
        Language::C => Box::new(CRunner::new(&toolchain.gcc)),
        Language::Cpp => Box::new(CppRunner::new(&toolchain.gxx)),
        Language::Java => Box::new(JavaRunner::new(&toolchain.javac, &toolchain.java)),
        Language::Python => Box::new(PythonRunner::new(&toolchain.python)),
        Language::JavaScript => Box::new(JavaScriptRunner::new(&toolchain.node)),
    }
}

pub(crate) fn path_arg(workspace: &Path, file: &str) -> String {
    workspace.join(file).to_string_lossy().to_string()
}
