use crate::error::ShowdepsResult;
use crate::query::Query;

/// Durable home of the last filter query.
///
/// `save` overwrites unconditionally; there is no locking, so concurrent
/// invocations race and the last writer wins.
pub trait QueryStore {
    fn save(&self, query: &Query) -> ShowdepsResult<()>;

    /// Fails with [`ShowdepsError::MissingState`](crate::ShowdepsError::MissingState)
    /// when nothing has been saved yet.
    fn load(&self) -> ShowdepsResult<Query>;
}
