//! The [`Container`] — a single file holding named, length-delimited
//! headers behind a 3-byte magic marker.
//!
//! ```no_run
//! use mge::{Container, Mode};
//!
//! // Write
//! let mut store = Container::open("config", Mode::Write)?;
//! store.additem("threshold", &19.35f64)?;
//! let mut list = store.addheader::<String>("names")?;
//! list.write(&"first".to_owned())?;
//! list.write(&"second".to_owned())?;
//! list.finalize()?;
//! drop(list);
//! store.close();
//!
//! // Read
//! let store = Container::open("config", Mode::Read)?;
//! assert_eq!(store.read_static::<f64>("threshold")?, 19.35);
//! for name in store.header::<String>("names")? {
//!     println!("{}", name?);
//! }
//! # Ok::<(), mge::Error>(())
//! ```
//!
//! # On-disk layout
//! ```text
//! offset 0:        3-byte magic "MGE"
//! repeated record:  8-byte name length (N)
//!                   N bytes of name
//!                   8-byte data size (S)  -- 0 at creation, backpatched
//!                   S bytes of payload
//! ```
//! All multi-byte integers are 8 bytes in the host's native byte order;
//! no endianness negotiation is ever performed.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor::{HeaderCursor, HeaderWriter};
use crate::error::{Error, Result};
use crate::value::{HeaderValue, ValueKind};

/// The marker at offset 0 of every container file.
pub const MAGIC: &[u8; 3] = b"MGE";
/// Appended to the given path unless it already carries this extension.
pub const EXTENSION: &str = "mge";

/// Open mode of a [`Container`].  Fixed for the container's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// One header's location, recorded during the open-time directory scan.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    /// Payload length in bytes.
    pub data_size: u64,
    /// Absolute file position of the first payload byte.
    pub data_offset: u64,
}

// ── Container ────────────────────────────────────────────────────────────────

/// Owns the file handle and, in read mode, the in-memory directory built by
/// one linear scan at open time.  Cursors borrow the handle and never
/// outlive the container.
#[derive(Debug)]
pub struct Container {
    file: Option<File>,
    mode: Mode,
    path: PathBuf,
    directory: Vec<DirectoryEntry>,
}

impl Container {
    /// Open (read mode) or create/truncate (write mode) a container.
    ///
    /// Write mode writes the magic immediately.  Read mode validates the
    /// magic — mismatch or short read is a [`Error::Format`] — and then
    /// scans every record to build the directory, an O(file size) cost
    /// paid once here.
    pub fn open<P: AsRef<Path>>(path: P, mode: Mode) -> Result<Self> {
        let path = normalize_extension(path.as_ref());
        let mut file = match mode {
            Mode::Write => File::create(&path),
            Mode::Read => File::open(&path),
        }
        .map_err(|source| Error::Open {
            path: path.clone(),
            mode,
            source,
        })?;

        let directory = match mode {
            Mode::Write => {
                file.write_all(MAGIC)?;
                Vec::new()
            }
            Mode::Read => {
                let mut magic = [0u8; 3];
                file.read_exact(&mut magic)
                    .map_err(|_| Error::Format("missing or short magic"))?;
                if &magic != MAGIC {
                    return Err(Error::Format("bad magic"));
                }
                scan_directory(&file)?
            }
        };

        tracing::debug!(
            path = %path.display(),
            ?mode,
            headers = directory.len(),
            "opened container"
        );
        Ok(Self {
            file: Some(file),
            mode,
            path,
            directory,
        })
    }

    /// Release the file handle.  Idempotent: closing twice, or dropping
    /// the container after an explicit close, is a no-op.
    pub fn close(&mut self) {
        self.file.take();
    }

    // ── Write side ───────────────────────────────────────────────────────────

    /// Start a new header: write its name, reserve a zeroed size field,
    /// and return a write cursor the caller must drive to completion.
    ///
    /// Names need not be unique; a duplicate shadows earlier entries only
    /// in the sense that lookup always resolves to the first match.
    pub fn addheader<T: HeaderValue>(&mut self, name: &str) -> Result<HeaderWriter<'_, T>> {
        if self.mode != Mode::Write {
            return Err(Error::Mode(Mode::Write));
        }
        let mut file = self.handle()?;
        file.write_u64::<NativeEndian>(name.len() as u64)?;
        file.write_all(name.as_bytes())?;

        let size_pos = file.stream_position()?;
        file.write_u64::<NativeEndian>(0)?; // backpatched by finalize
        let data_start = file.stream_position()?;

        Ok(HeaderWriter::new(file, name.to_owned(), size_pos, data_start))
    }

    /// Convenience: open a header, write exactly one value, finalize.
    pub fn additem<T: HeaderValue>(&mut self, name: &str, value: &T) -> Result<()> {
        let mut writer = self.addheader::<T>(name)?;
        writer.write(value)?;
        writer.finalize()
    }

    // ── Read side ────────────────────────────────────────────────────────────

    /// Look up `name` in the directory and return a read cursor over its
    /// payload.
    ///
    /// For a fixed-width `T` the payload length must be a multiple of the
    /// element width; the check happens here, not at first read.  The
    /// shared borrow allows any number of simultaneously live cursors.
    pub fn header<T: HeaderValue>(&self, name: &str) -> Result<HeaderCursor<'_, T>> {
        let entry = self
            .directory
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;

        if let ValueKind::Fixed(width) = T::kind() {
            if entry.data_size % width != 0 {
                return Err(Error::SizeMismatch {
                    data_size: entry.data_size,
                    width,
                });
            }
        }

        let file = self.handle()?;
        Ok(HeaderCursor::new(file, entry.data_offset, entry.data_size))
    }

    /// Convenience: read the first element of the named header.
    pub fn read_static<T: HeaderValue>(&self, name: &str) -> Result<T> {
        let mut cursor = self.header::<T>(name)?;
        cursor.read()
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The normalized path the container was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory entries in file order.  Empty in write mode.
    pub fn headers(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.directory.iter()
    }

    fn handle(&self) -> Result<&File> {
        self.file
            .as_ref()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::Other, "container is closed")))
    }
}

// ── Directory scan ───────────────────────────────────────────────────────────

/// One linear pass over every record.  The only legal termination is a
/// clean end-of-file exactly at the start of a record; a declared size
/// that runs past the end of the file surfaces as the same generic
/// [`Error::Format`] on the next iteration.
fn scan_directory(mut file: &File) -> Result<Vec<DirectoryEntry>> {
    let file_len = file.metadata()?.len();
    let mut directory = Vec::new();

    loop {
        let pos = file.stream_position()?;
        if pos == file_len {
            break;
        }
        if pos > file_len {
            return Err(Error::Format("header data runs past end of file"));
        }

        let name_len = file
            .read_u64::<NativeEndian>()
            .map_err(|_| Error::Format("truncated header record"))?;
        let mut name = vec![0u8; name_len as usize];
        file.read_exact(&mut name)
            .map_err(|_| Error::Format("truncated header record"))?;
        let name =
            String::from_utf8(name).map_err(|_| Error::Format("header name is not valid UTF-8"))?;
        let data_size = file
            .read_u64::<NativeEndian>()
            .map_err(|_| Error::Format("truncated header record"))?;

        let data_offset = file.stream_position()?;
        directory.push(DirectoryEntry {
            name,
            data_size,
            data_offset,
        });

        // Skip the payload; no bounds check here — an undersized file
        // fails on the next iteration's read instead.
        let next_record = data_offset
            .checked_add(data_size)
            .ok_or(Error::Format("header data runs past end of file"))?;
        file.seek(SeekFrom::Start(next_record))?;
    }

    Ok(directory)
}

fn normalize_extension(path: &Path) -> PathBuf {
    if path.extension().map_or(false, |ext| ext == EXTENSION) {
        return path.to_owned();
    }
    let mut raw = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(EXTENSION);
    PathBuf::from(raw)
}
