use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use showdeps_core::{Query, QueryStore, ShowdepsError, ShowdepsResult};

pub const RECORD_FILE_NAME: &str = "last_graphdeps_query.cfg";

/// Last filter query kept as one space-joined line in a plain file.
pub struct FileQueryStore {
    path: PathBuf,
}

impl FileQueryStore {
    /// Open the record at `path`, creating its parent directory if needed.
    /// The record itself is only written on the first `save`.
    pub fn new(path: &Path) -> ShowdepsResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QueryStore for FileQueryStore {
    fn save(&self, query: &Query) -> ShowdepsResult<()> {
        let line = query.encode();
        debug!("saving query '{line}' to {}", self.path.display());
        std::fs::write(&self.path, line)?;
        Ok(())
    }

    fn load(&self) -> ShowdepsResult<Query> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ShowdepsError::MissingState(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let query = Query::decode(&content);
        if query.is_empty() {
            return Err(ShowdepsError::MissingState(self.path.clone()));
        }
        debug!("loaded query '{query}' from {}", self.path.display());
        Ok(query)
    }
}
