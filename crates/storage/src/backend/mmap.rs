// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-capacity memory-mapped backend
//!
//! File layout (little-endian):
//!
//! ```text
//! [0..8)     magic  "RPWAL\0\0\x01"
//! [8..12)    version
//! [12..16)   status        1 = open, 2 = closed
//! [16..24)   data_length   bytes of entry data made durable by flush
//! [24..28)   next_path_len
//! [28..512)  next_path     set when the file was sealed by rotation
//! [512..)    entry data
//! ```
//!
//! Bytes past `data_length` were never flushed and are ignored on reopen.

use super::{ensure_parent, Storage};
use crate::error::StorageError;
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub(crate) const HEADER_SIZE: usize = 512;
pub(crate) const MAGIC: &[u8; 8] = b"RPWAL\0\0\x01";
const VERSION: u32 = 1;
const STATUS_OPEN: u32 = 1;
const STATUS_CLOSED: u32 = 2;
const NEXT_PATH_OFFSET: usize = 28;
const MAX_NEXT_PATH: usize = HEADER_SIZE - NEXT_PATH_OFFSET;

/// Decoded header of an mmap WAL file
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) status: u32,
    pub(crate) data_length: u64,
    pub(crate) next_path: Option<String>,
}

impl Header {
    fn open(data_length: u64) -> Self {
        Self {
            status: STATUS_OPEN,
            data_length,
            next_path: None,
        }
    }

    /// Whether `bytes` begins with an mmap WAL header
    pub(crate) fn detect(bytes: &[u8]) -> bool {
        bytes.len() >= HEADER_SIZE && bytes.starts_with(MAGIC)
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        if !Self::detect(bytes) {
            return Err(StorageError::InvalidHeader("missing magic".to_string()));
        }
        let version = read_u32(bytes, 8);
        if version != VERSION {
            return Err(StorageError::InvalidHeader(format!(
                "unsupported version {version}"
            )));
        }
        let status = read_u32(bytes, 12);
        let data_length = read_u64(bytes, 16);
        let next_len = read_u32(bytes, 24) as usize;
        if next_len > MAX_NEXT_PATH {
            return Err(StorageError::InvalidHeader(format!(
                "next path length {next_len} exceeds header"
            )));
        }
        let next_path = if next_len == 0 {
            None
        } else {
            let raw = &bytes[NEXT_PATH_OFFSET..NEXT_PATH_OFFSET + next_len];
            let path = std::str::from_utf8(raw)
                .map_err(|e| StorageError::InvalidHeader(e.to_string()))?;
            Some(path.to_string())
        };
        Ok(Self {
            status,
            data_length,
            next_path,
        })
    }

    fn encode_into(&self, out: &mut [u8]) -> Result<(), StorageError> {
        let next = self.next_path.as_deref().unwrap_or("").as_bytes();
        if next.len() > MAX_NEXT_PATH {
            return Err(StorageError::PathTooLong(next.len()));
        }
        let header = &mut out[..HEADER_SIZE];
        header.fill(0);
        header[..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        header[12..16].copy_from_slice(&self.status.to_le_bytes());
        header[16..24].copy_from_slice(&self.data_length.to_le_bytes());
        header[24..28].copy_from_slice(&(next.len() as u32).to_le_bytes());
        header[NEXT_PATH_OFFSET..NEXT_PATH_OFFSET + next.len()].copy_from_slice(next);
        Ok(())
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

#[allow(unsafe_code)]
fn map_file(file: &File) -> std::io::Result<MmapMut> {
    // SAFETY: the file is opened read-write by this process and sized before
    // mapping; the WAL is single-writer, so nothing truncates it while mapped.
    unsafe { MmapMut::map_mut(file) }
}

/// WAL storage over a pre-sized memory-mapped file; flush is msync
pub struct MmapStorage {
    path: PathBuf,
    map: Option<MmapMut>,
    /// Size of the data region after the header
    capacity: u64,
    /// Write cursor within the data region
    offset: u64,
    /// Cursor as of the last flush, mirrored in the header
    synced: u64,
}

impl MmapStorage {
    /// Open an existing mmap WAL or create one with `capacity` data bytes
    ///
    /// An existing file keeps its own size; writing resumes after the last
    /// flushed byte.
    pub fn open(path: &Path, capacity: u64) -> Result<Self, StorageError> {
        ensure_parent(path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();

        if len == 0 {
            file.set_len(HEADER_SIZE as u64 + capacity)?;
            let mut map = map_file(&file)?;
            Header::open(0).encode_into(&mut map)?;
            map.flush_range(0, HEADER_SIZE)?;
            tracing::debug!(path = %path.display(), capacity, "created mmap WAL");
            return Ok(Self {
                path: path.to_path_buf(),
                map: Some(map),
                capacity,
                offset: 0,
                synced: 0,
            });
        }

        if len < HEADER_SIZE as u64 {
            return Err(StorageError::InvalidHeader(format!(
                "file is {len} bytes, shorter than header"
            )));
        }
        let mut map = map_file(&file)?;
        let header = Header::decode(&map)?;
        if let Some(next) = header.next_path {
            return Err(StorageError::InvalidHeader(format!(
                "sealed by rotation to {next}"
            )));
        }
        let capacity = len - HEADER_SIZE as u64;
        if header.data_length > capacity {
            return Err(StorageError::InvalidHeader(format!(
                "data length {} exceeds capacity {capacity}",
                header.data_length
            )));
        }
        Header::open(header.data_length).encode_into(&mut map)?;
        map.flush_range(0, HEADER_SIZE)?;
        tracing::debug!(
            path = %path.display(),
            capacity,
            data_length = header.data_length,
            "reopened mmap WAL"
        );
        Ok(Self {
            path: path.to_path_buf(),
            map: Some(map),
            capacity,
            offset: header.data_length,
            synced: header.data_length,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    fn map(&mut self) -> Result<&mut MmapMut, StorageError> {
        self.map.as_mut().ok_or(StorageError::Closed)
    }

    /// Rewrite the header with `status` and `next_path`, then msync it
    fn write_header(
        &mut self,
        status: u32,
        next_path: Option<String>,
    ) -> Result<(), StorageError> {
        let header = Header {
            status,
            data_length: self.synced,
            next_path,
        };
        let map = self.map()?;
        header.encode_into(map)?;
        map.flush_range(0, HEADER_SIZE)?;
        Ok(())
    }
}

impl Storage for MmapStorage {
    fn write(&mut self, data: &[u8]) -> Result<(), StorageError> {
        let remaining = self.capacity - self.offset;
        let requested = data.len() as u64;
        if requested > remaining {
            return Err(StorageError::Full {
                requested,
                remaining,
            });
        }
        let start = HEADER_SIZE + self.offset as usize;
        let map = self.map()?;
        map[start..start + data.len()].copy_from_slice(data);
        self.offset += requested;
        Ok(())
    }

    fn remaining(&self) -> Option<u64> {
        Some(self.capacity - self.offset)
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        let start = HEADER_SIZE + self.synced as usize;
        let len = (self.offset - self.synced) as usize;
        if len > 0 {
            self.map()?.flush_range(start, len)?;
        }
        self.synced = self.offset;
        self.write_header(STATUS_OPEN, None)
    }

    fn discard_unflushed(&mut self) -> Result<(), StorageError> {
        if self.map.is_none() {
            return Err(StorageError::Closed);
        }
        // bytes past `synced` are outside data_length and get overwritten
        self.offset = self.synced;
        Ok(())
    }

    fn size(&self) -> Result<u64, StorageError> {
        if self.map.is_none() {
            return Err(StorageError::Closed);
        }
        Ok(self.synced)
    }

    /// Seal this file with a link to `new_path`, then map a fresh region of
    /// the same capacity there
    fn rotate(&mut self, new_path: &Path) -> Result<(), StorageError> {
        let next = new_path
            .to_str()
            .ok_or_else(|| StorageError::InvalidHeader("non UTF-8 path".to_string()))?
            .to_string();
        if next.len() > MAX_NEXT_PATH {
            return Err(StorageError::PathTooLong(next.len()));
        }

        self.flush()?;
        let next_storage = MmapStorage::open(new_path, self.capacity)?;
        self.write_header(STATUS_CLOSED, Some(next))?;

        let old = std::mem::replace(self, next_storage);
        tracing::info!(
            old = %old.path.display(),
            new = %self.path.display(),
            "rotated mmap WAL"
        );
        Ok(())
    }

    fn close(&mut self) -> Result<(), StorageError> {
        if self.map.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.write_header(STATUS_CLOSED, None)?;
        self.map = None;
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "mmap_tests.rs"]
mod tests;
