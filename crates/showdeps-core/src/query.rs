use std::fmt;

/// Ordered filter tokens, e.g. `["pro:work", "+PENDING"]`.
///
/// Serializes to a single space-joined line. A token that itself contains a
/// space does not survive a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
}

impl Query {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Decode a persisted record line. A trailing newline is ignored.
    pub fn decode(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Self::default();
        }
        Self::new(line.split(' '))
    }

    pub fn encode(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Copy of this query with `token` appended.
    pub fn with(&self, token: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push(token);
        next
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
