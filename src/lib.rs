pub mod container;
pub mod cursor;
pub mod error;
pub mod value;

pub use container::{Container, DirectoryEntry, Mode, EXTENSION, MAGIC};
pub use cursor::{HeaderCursor, HeaderWriter};
pub use error::{Error, Result};
pub use value::{HeaderValue, ValueKind};
