use std::collections::{BTreeSet, HashMap};

/// Taskwarrior action commands (https://taskwarrior.org/docs/commands/).
pub const TASKWARRIOR_COMMANDS: &[&str] = &[
    "add",
    "annotate",
    "append",
    "calc",
    "config",
    "context",
    "count",
    "delete",
    "denotate",
    "done",
    "duplicate",
    "edit",
    "execute",
    "export",
    "help",
    "import",
    "log",
    "logo",
    "modify",
    "prepend",
    "purge",
    "start",
    "stop",
    "synchronize",
    "undo",
    "version",
];

/// Shortest prefix length considered for truncation matching.
pub const MIN_PREFIX_LEN: usize = 2;

/// Known action commands plus, for every length in `[2, max_len]`, how many
/// command names truncate to each prefix of that length.
///
/// Lengths count characters, not bytes.
#[derive(Debug, Clone)]
pub struct CommandTable {
    max_len: usize,
    truncations: HashMap<usize, HashMap<String, usize>>,
}

impl CommandTable {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        let max_len = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

        let mut truncations = HashMap::new();
        for len in MIN_PREFIX_LEN..=max_len {
            let mut counts: HashMap<String, usize> = HashMap::new();
            for name in &names {
                let prefix: String = name.chars().take(len).collect();
                *counts.entry(prefix).or_default() += 1;
            }
            truncations.insert(len, counts);
        }

        Self {
            max_len,
            truncations,
        }
    }

    pub fn taskwarrior() -> Self {
        Self::new(TASKWARRIOR_COMMANDS.iter().copied())
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of command names that truncate to exactly `token` when cut to
    /// the token's own length. Tokens outside `[2, max_len]` never match.
    pub fn match_count(&self, token: &str) -> usize {
        let len = token.chars().count();
        if !(MIN_PREFIX_LEN..=self.max_len).contains(&len) {
            return 0;
        }
        self.truncations
            .get(&len)
            .and_then(|counts| counts.get(token))
            .copied()
            .unwrap_or(0)
    }

    /// True when exactly one command abbreviates to `token`.
    pub fn is_unique_command(&self, token: &str) -> bool {
        self.match_count(token) == 1
    }
}
