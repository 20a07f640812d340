/// Errors that can end a run, either before execution (bracket validation)
/// or during it. Every variant that points at the program carries the
/// offending instruction-stream index.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A `]` appeared with no `[` still open before it.
    #[error("dangling closing bracket at index {index}")]
    DanglingClose { index: usize },

    /// A `[` was never closed. `index` is the earliest such opener.
    #[error("unmatched opening bracket at index {index}")]
    UnmatchedOpen { index: usize },

    /// The data pointer attempted to move left of cell 0 or past the last cell.
    #[error("pointer out of bounds at instruction {ip} (ptr={ptr}, op='{op}')")]
    PointerOutOfBounds { ip: usize, ptr: usize, op: char },

    /// A machine was configured with an empty tape.
    #[error("tape length must be at least 1 (got {given})")]
    InvalidTapeLength { given: usize },

    /// The output sink or input source failed.
    #[error("I/O error at instruction {ip}: {source}")]
    Io {
        ip: usize,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Instruction-stream index this error points at, for caret reporting.
    pub fn index(&self) -> Option<usize> {
        match self {
            RunError::DanglingClose { index } | RunError::UnmatchedOpen { index } => Some(*index),
            RunError::PointerOutOfBounds { ip, .. } | RunError::Io { ip, .. } => Some(*ip),
            RunError::InvalidTapeLength { .. } => None,
        }
    }
}
