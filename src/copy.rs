//! Chunked stream copying with per-chunk progress.
//!
//! Every byte moved by the writer, the extractor and the dataset transformer
//! goes through [`copy_chunked`], which reads a source in fixed-size chunks so
//! peak memory stays bounded by the [`TransferBuffer`] size.
//!
//! # Loop termination
//!
//! A chunk is "full" when the buffer was filled completely. The loop continues
//! after every full chunk and stops after the first short one. A source whose
//! length is an exact multiple of the buffer size therefore ends with one
//! zero-length pass, which is reported like any other chunk.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::ops::ControlFlow;

/// IEC byte unit: 1 MiB = 1024 KiB.
pub const BYTES_MIB: u64 = 1024 * 1024;

/// Default transfer buffer used when writing archives (100 MiB).
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 100 * BYTES_MIB as usize;

/// Default transfer buffer used when extracting archives (10 MiB).
pub const DEFAULT_EXTRACT_BUFFER_SIZE: usize = 10 * BYTES_MIB as usize;

/// Converts a byte count to whole mebibytes (rounding down).
pub fn bytes_to_mib(bytes: u64) -> u64 {
    bytes / BYTES_MIB
}

/// Fixed-size byte buffer reused across the chunk copies of one operation.
///
/// The memory is allocated on first use and keeps its size until released.
/// The size can only be changed while nothing has been allocated yet.
#[derive(Debug)]
pub struct TransferBuffer {
    size: usize,
    data: Option<Vec<u8>>,
}

impl TransferBuffer {
    /// Creates an unallocated buffer of `size` bytes (at least one byte).
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            data: None,
        }
    }

    /// Returns the configured size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true once the memory has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.data.is_some()
    }

    /// Changes the size of a buffer that has not been allocated yet.
    ///
    /// Returns false (and leaves the size untouched) if the buffer is already
    /// in use.
    pub fn resize(&mut self, size: usize) -> bool {
        if self.is_allocated() {
            return false;
        }
        self.size = size.max(1);
        true
    }

    /// Returns the buffer, allocating it on first call.
    pub fn get(&mut self) -> &mut [u8] {
        let size = self.size;
        self.data.get_or_insert_with(|| vec![0u8; size])
    }

    /// Frees the memory. A later [`get`](Self::get) allocates again.
    pub fn release(&mut self) {
        self.data = None;
    }
}

/// Which side of a chunked copy failed.
#[derive(Debug)]
pub enum CopyError {
    /// Reading from the source failed.
    Source(io::Error),
    /// Writing to the sink failed.
    Sink(io::Error),
}

impl CopyError {
    /// Returns the underlying I/O error.
    pub fn into_io(self) -> io::Error {
        match self {
            Self::Source(e) | Self::Sink(e) => e,
        }
    }
}

impl From<CopyError> for io::Error {
    fn from(e: CopyError) -> Self {
        e.into_io()
    }
}

impl From<CopyError> for crate::Error {
    fn from(e: CopyError) -> Self {
        crate::Error::Io(e.into_io())
    }
}

/// Reads from `source` until `buf` is full or the source is exhausted.
///
/// Returns the number of bytes placed in `buf`; anything less than
/// `buf.len()` means end of source.
pub fn fill_buffer<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Copies `source` into `sink` one buffer at a time.
///
/// `on_chunk` receives the cumulative number of bytes copied after every
/// chunk, including the terminal short (possibly empty) one. Returns the total
/// number of bytes copied.
pub fn copy_chunked<R, W, F>(
    source: &mut R,
    sink: &mut W,
    buffer: &mut [u8],
    mut on_chunk: F,
) -> std::result::Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    F: FnMut(u64),
{
    if buffer.is_empty() {
        return Err(CopyError::Sink(io::Error::new(
            io::ErrorKind::InvalidInput,
            "transfer buffer must not be empty",
        )));
    }

    let mut copied: u64 = 0;
    loop {
        let n = fill_buffer(source, buffer).map_err(CopyError::Source)?;
        sink.write_all(&buffer[..n]).map_err(CopyError::Sink)?;
        copied += n as u64;
        on_chunk(copied);
        if n < buffer.len() {
            break;
        }
    }
    Ok(copied)
}

/// Returns the total length of a seekable stream, keeping its position.
pub fn stream_len<S: Seek + ?Sized>(stream: &mut S) -> io::Result<u64> {
    let current = stream.stream_position()?;
    let end = stream.seek(SeekFrom::End(0))?;
    if current != end {
        stream.seek(SeekFrom::Start(current))?;
    }
    Ok(end)
}

/// Reads a seekable stream from `offset` into memory, chunk by chunk.
///
/// `on_chunk(total, read_so_far)` is called after every chunk and may return
/// [`ControlFlow::Break`] to stop early; the bytes read up to that point are
/// returned. Returns `None` if `offset` lies beyond the end of the stream.
pub fn read_to_memory<R, F>(
    source: &mut R,
    offset: u64,
    chunk_size: usize,
    mut on_chunk: F,
) -> io::Result<Option<Vec<u8>>>
where
    R: Read + Seek + ?Sized,
    F: FnMut(u64, u64) -> ControlFlow<()>,
{
    let total = stream_len(source)?;
    if offset > total {
        return Ok(None);
    }
    source.seek(SeekFrom::Start(offset))?;

    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut out = Vec::new();
    let mut read: u64 = 0;
    loop {
        let n = fill_buffer(source, &mut buffer)?;
        out.extend_from_slice(&buffer[..n]);
        read += n as u64;
        if on_chunk(total, read).is_break() {
            break;
        }
        if n < buffer.len() {
            break;
        }
    }
    Ok(Some(out))
}
