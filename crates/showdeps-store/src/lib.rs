mod store;

pub use store::{FileQueryStore, RECORD_FILE_NAME};
