use std::path::PathBuf;

use serde::Deserialize;

/// Binaries used to compile and run each supported language.
#[derive(Debug, Deserialize, Clone)]
pub struct ToolchainConfig {
    #[serde(default = "default_gcc")]
    pub gcc: String,
    #[serde(default = "default_gxx")]
    pub gxx: String,
    #[serde(default = "default_javac")]
    pub javac: String,
    #[serde(default = "default_java")]
    pub java: String,
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_node")]
    pub node: String,
}

fn default_gcc() -> String {
    "gcc".into()
}
fn default_gxx() -> String {
    "g++".into()
}
fn default_javac() -> String {
    "javac".into()
}
fn default_java() -> String {
    "java".into()
}
fn default_python() -> String {
    "python3".into()
}
fn default_node() -> String {
    "node".into()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            gcc: default_gcc(),
            gxx: default_gxx(),
            javac: default_javac(),
            java: default_java(),
            python: default_python(),
            node: default_node(),
        }
    }
}

/// Execution dispatcher configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Parent directory for per-execution workspaces. Default: the system temp dir.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
    /// Hard limit on the compile phase. Default: 10000.
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,
    /// Extra time a program may run past its limit before being killed. Default: 1000.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    /// Per-stream capture cap. Default: 1 MiB.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Global cap on simultaneously running executions. Default: 4.
    #[serde(default = "default_max_concurrent_executions")]
    pub max_concurrent_executions: usize,
    /// Test cases of one submission evaluated at once. Default: 1 (sequential).
    #[serde(default = "default_max_parallel_test_cases")]
    pub max_parallel_test_cases: usize,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

fn default_compile_timeout_ms() -> u64 {
    10_000
}
fn default_grace_ms() -> u64 {
    1_000
}
fn default_max_output_bytes() -> usize {
    1024 * 1024
}
fn default_max_concurrent_executions() -> usize {
    4
}
fn default_max_parallel_test_cases() -> usize {
    1
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            compile_timeout_ms: default_compile_timeout_ms(),
            grace_ms: default_grace_ms(),
            max_output_bytes: default_max_output_bytes(),
            max_concurrent_executions: default_max_concurrent_executions(),
            max_parallel_test_cases: default_max_parallel_test_cases(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}
