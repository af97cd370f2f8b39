use thiserror::Error;

/// Infrastructure failures of the execution dispatcher.
///
/// Program misbehaviour (compile errors, crashes, timeouts) is not an error here;
/// it is reported through `ExecutionOutcome`.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty command line")]
    EmptyCommand,

    #[error("Dispatcher is shutting down")]
    Shutdown,
}

pub type Result<T> = std::result::Result<T, DispatchError>;
