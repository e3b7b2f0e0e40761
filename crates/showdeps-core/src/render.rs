use std::path::Path;

use crate::error::ShowdepsResult;
use crate::query::Query;

/// Filter token that hides soft-deleted tasks from the graph.
pub const EXCLUDE_DELETED: &str = "-DELETED";

/// Turns filter tokens into a dependency-graph image at `output`,
/// overwriting whatever was there.
pub trait Renderer {
    fn render(&self, query: &Query, output: &Path, verbose: bool) -> ShowdepsResult<()>;
}

/// Query actually handed to the renderer.
pub fn effective_query(query: &Query, show_deleted: bool) -> Query {
    if show_deleted {
        query.clone()
    } else {
        query.with(EXCLUDE_DELETED)
    }
}
