pub mod classify;
pub mod command_table;
pub mod error;
pub mod query;
pub mod render;
pub mod store;

pub use classify::{classify, Classification};
pub use command_table::{CommandTable, TASKWARRIOR_COMMANDS};
pub use error::{ShowdepsError, ShowdepsResult};
pub use query::Query;
pub use render::{effective_query, Renderer, EXCLUDE_DELETED};
pub use store::QueryStore;
