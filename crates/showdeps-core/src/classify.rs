use std::fmt;

use crate::command_table::CommandTable;

/// What a raw argument list turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The whole argument list is a filter query.
    Report,
    /// An action command sits at 1-based position `at`. `at == 0` means no
    /// arguments were given: reuse the last query and run no action.
    Command { at: usize },
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report => write!(f, "report"),
            Self::Command { at: 0 } => write!(f, "reuse"),
            Self::Command { at } => write!(f, "command at {at}"),
        }
    }
}

/// Scan left to right; the first token that abbreviates exactly one known
/// command marks the command position. Ambiguous and unknown tokens are
/// filter content.
pub fn classify<S: AsRef<str>>(table: &CommandTable, args: &[S]) -> Classification {
    if args.is_empty() {
        return Classification::Command { at: 0 };
    }

    args.iter()
        .position(|arg| table.is_unique_command(arg.as_ref()))
        .map(|idx| Classification::Command { at: idx + 1 })
        .unwrap_or(Classification::Report)
}
