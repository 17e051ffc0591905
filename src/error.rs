use thiserror::Error;

use crate::io::ItemId;

/// Failure while ingesting a startup snapshot. Any of these is fatal: the
/// stores are never served partially loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The snapshot file could not be opened or read.
    #[error("cannot read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// A record is missing a required column or holds an unparsable value.
    #[error("malformed snapshot {path} at {position}: {source}")]
    Malformed {
        path: String,
        position: String,
        #[source]
        source: csv::Error,
    },
    #[error("snapshot {path} scores {item_id} -> {similar_item_id} with a non-finite value")]
    NonFiniteScore {
        path: String,
        item_id: ItemId,
        similar_item_id: ItemId,
    },
    #[error("fallback snapshot {path} contains no items")]
    EmptyFallback { path: String },
}

impl LoadError {
    pub(crate) fn from_csv(path: &str, source: csv::Error) -> Self {
        if source.is_io_error() {
            return LoadError::Io {
                path: path.to_string(),
                source,
            };
        }
        let position = match source.position() {
            Some(pos) => format!("line {}", pos.line()),
            None => String::from("header"),
        };
        LoadError::Malformed {
            path: path.to_string(),
            position,
            source,
        }
    }
}
