pub mod config;
pub mod dispatcher;
pub mod error;
pub mod judge;
pub mod language;
pub mod marks;
pub mod process;

pub use config::{ToolchainConfig, WorkerConfig};
pub use dispatcher::{Dispatcher, ProcessDispatcher};
pub use error::{DispatchError, Result};
pub use judge::{classify, evaluate, outputs_match};
pub use language::{Language, LanguageRunner, UnsupportedLanguage, runner_for};
pub use marks::{FALLBACK_TOTAL_MARKS, allocate_marks};
