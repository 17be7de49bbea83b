//! Chunked byte reader for multi-gigabyte files

use super::ScanError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads a large file as a lazy, forward-only sequence of byte blocks.
///
/// Without overlap, the emitted blocks cover the file exactly once, in
/// order: a file of size S with chunk size C yields ceil(S/C) blocks whose
/// concatenation reconstructs the file, the last one short rather than
/// padded. With overlap, each block after the first is prefixed with the
/// tail of the previous one; the block count is unchanged.
pub struct ChunkedReader {
    file: File,
    path: PathBuf,
    chunk_size: usize,
    overlap: usize,
    file_size: u64,
    /// Tail of the previous chunk, prepended to the next block
    carry: Vec<u8>,
    done: bool,
}

impl ChunkedReader {
    /// Open a file for chunked reading. Fails fast if the path does not
    /// exist or is unreadable.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        assert!(chunk_size > 0, "chunk_size must be positive");

        let file = File::open(&path).map_err(|source| ScanError::Io {
            path: path.clone(),
            source,
        })?;
        let file_size = file
            .metadata()
            .map_err(|source| ScanError::Io {
                path: path.clone(),
                source,
            })?
            .len();

        Ok(Self {
            file,
            path,
            chunk_size,
            overlap: 0,
            file_size,
            carry: Vec::new(),
            done: false,
        })
    }

    /// Enable an overlap window between consecutive chunks.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        assert!(overlap < self.chunk_size, "overlap must be smaller than chunk_size");
        self.overlap = overlap;
        self
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Expected number of chunks, for progress reporting.
    pub fn chunk_count_hint(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size as u64)
    }

    /// Read up to `chunk_size` fresh bytes, looping over short reads.
    fn read_fresh(&mut self) -> Result<Vec<u8>, ScanError> {
        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::Io {
                        path: self.path.clone(),
                        source,
                    })
                }
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

impl Iterator for ChunkedReader {
    type Item = Result<Vec<u8>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let fresh = match self.read_fresh() {
            Ok(fresh) => fresh,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if fresh.is_empty() {
            self.done = true;
            return None;
        }

        if fresh.len() < self.chunk_size {
            // Final short block
            self.done = true;
        }

        let block = if self.carry.is_empty() {
            fresh.clone()
        } else {
            let mut block = Vec::with_capacity(self.carry.len() + fresh.len());
            block.extend_from_slice(&self.carry);
            block.extend_from_slice(&fresh);
            block
        };

        if self.overlap > 0 {
            let tail_start = fresh.len().saturating_sub(self.overlap);
            self.carry = fresh[tail_start..].to_vec();
        }

        Some(Ok(block))
    }
}
