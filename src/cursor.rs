//! Header cursors — the typed read/write ends of a single header.
//!
//! # Writer
//! [`HeaderWriter`] appends encoded values at the shared file position and
//! backpatches the header's reserved size field on [`finalize`].  The final
//! size is simply `file position at finalize − data_start`, so the writer
//! never needs to know the size up front.  Dropping an unfinalized writer
//! finalizes it best-effort, guaranteeing no record is left on disk with a
//! zero size field.
//!
//! # Reader
//! [`HeaderCursor`] keeps a logical cursor inside `[data_start,
//! data_start + data_size)` that is distinct from the file's absolute
//! position.  Every `read()` saves the absolute position, seeks to the
//! cursor, decodes one value, and seeks back before returning.  That
//! save-and-restore discipline is what makes any number of simultaneously
//! live cursors safe to interleave over one shared handle: each call
//! borrows the file position and restores it, at the cost of one extra
//! seek per read.
//!
//! [`finalize`]: HeaderWriter::finalize

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::marker::PhantomData;

use byteorder::{NativeEndian, WriteBytesExt};

use crate::error::{Error, Result};
use crate::value::HeaderValue;

// ── Writer ───────────────────────────────────────────────────────────────────

/// Accumulating write cursor over one header, created by
/// [`Container::addheader`](crate::Container::addheader).
///
/// Holding one mutably borrows the container, so a second unfinalized
/// writer cannot be started while this one is live — between `addheader`
/// and `finalize` the file's append position is the sole source of truth
/// for the header's extent.
#[derive(Debug)]
pub struct HeaderWriter<'a, T: HeaderValue> {
    file: &'a File,
    name: String,
    size_pos: u64,
    data_start: u64,
    cursor: u64,
    finalized: bool,
    _value: PhantomData<fn() -> T>,
}

impl<'a, T: HeaderValue> HeaderWriter<'a, T> {
    pub(crate) fn new(file: &'a File, name: String, size_pos: u64, data_start: u64) -> Self {
        Self {
            file,
            name,
            size_pos,
            data_start,
            cursor: 0,
            finalized: false,
            _value: PhantomData,
        }
    }

    /// Append one encoded value.  May be called any number of times before
    /// [`finalize`](Self::finalize).
    pub fn write(&mut self, value: &T) -> Result<()> {
        let mut file = self.file;
        let written = value.encode(&mut file)?;
        self.cursor += written;
        Ok(())
    }

    /// Backpatch the reserved size field with the header's true size, then
    /// restore the file position so subsequent headers continue correctly.
    /// Idempotent; also invoked on drop if never called.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        let mut file = self.file;
        let end_pos = file.stream_position()?;
        let data_size = end_pos - self.data_start;
        file.seek(SeekFrom::Start(self.size_pos))?;
        file.write_u64::<NativeEndian>(data_size)?;
        file.seek(SeekFrom::Start(end_pos))?;
        self.finalized = true;
        Ok(())
    }
}

impl<T: HeaderValue> Drop for HeaderWriter<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.finalize() {
            // Nowhere to propagate from a destructor; the size field may
            // still hold the zero placeholder.
            tracing::error!("auto-finalize of header {:?} failed: {err}", self.name);
        }
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

/// Lazy sequential read cursor over one header, created by
/// [`Container::header`](crate::Container::header).
#[derive(Debug)]
pub struct HeaderCursor<'a, T: HeaderValue> {
    file: &'a File,
    data_start: u64,
    data_size: u64,
    cursor: u64,
    _value: PhantomData<fn() -> T>,
}

impl<'a, T: HeaderValue> HeaderCursor<'a, T> {
    pub(crate) fn new(file: &'a File, data_start: u64, data_size: u64) -> Self {
        Self {
            file,
            data_start,
            data_size,
            cursor: 0,
            _value: PhantomData,
        }
    }

    /// Whether another value remains.  No side effects.
    pub fn next(&self) -> bool {
        self.cursor < self.data_size
    }

    /// Decode the value at the cursor and advance past it.
    ///
    /// The file's absolute position is saved before the seek and restored
    /// before returning (even if decoding fails), so other live cursors
    /// never observe this call.
    pub fn read(&mut self) -> Result<T> {
        if !HeaderCursor::next(self) {
            return Err(Error::OutOfBounds);
        }
        let mut file = self.file;
        let saved_pos = file.stream_position()?;
        file.seek(SeekFrom::Start(self.data_start + self.cursor))?;
        let decoded = T::decode(&mut file);
        file.seek(SeekFrom::Start(saved_pos))?;

        let (value, consumed) = decoded?;
        self.cursor += consumed;
        Ok(value)
    }
}

impl<T: HeaderValue> Iterator for HeaderCursor<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if HeaderCursor::next(self) {
            Some(self.read())
        } else {
            None
        }
    }
}
