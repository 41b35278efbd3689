use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::container::Mode;

/// Errors produced by the container and its cursors.
///
/// All failures are fail-fast: the operation that hit the error did not
/// complete and nothing retries on the caller's behalf.  `Container::close`
/// is the one infallible operation and does not appear here.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying file could not be opened for the requested mode.
    #[error("failed to open {path:?} ({mode:?} mode): {source}")]
    Open {
        path: PathBuf,
        mode: Mode,
        #[source]
        source: io::Error,
    },

    /// Bad magic, or a truncated/malformed header record.  Corruption is
    /// never distinguished by which field was short.
    #[error("invalid container: {0}")]
    Format(&'static str),

    /// No header with the requested name exists in the directory.
    #[error("header not found: {0}")]
    NotFound(String),

    /// The operation requires the other open mode.
    #[error("operation requires {0:?} mode")]
    Mode(Mode),

    /// A fixed-width header's byte length is not a multiple of the
    /// element width.  Raised at lookup time, not at first read.
    #[error("header size {data_size} is not a multiple of element width {width}")]
    SizeMismatch { data_size: u64, width: u64 },

    /// `read()` was called with the cursor already at the end of the header.
    #[error("cursor is past the end of the header")]
    OutOfBounds,

    /// The named value kind is not one the codec knows how to store.
    #[error("unsupported value kind: {0}")]
    UnsupportedType(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
