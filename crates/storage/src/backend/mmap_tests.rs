// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn read_header(path: &Path) -> Header {
    Header::decode(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn create_sizes_file_and_writes_header() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");

    let storage = MmapStorage::open(&path, 1024).unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024 + 512);
    assert_eq!(storage.capacity(), 1024);
    assert_eq!(storage.remaining(), Some(1024));
    assert_eq!(
        read_header(&path),
        Header {
            status: STATUS_OPEN,
            data_length: 0,
            next_path: None,
        }
    );
}

#[test]
fn write_beyond_capacity_is_full_and_leaves_data() {
    let dir = TempDir::new().unwrap();
    let mut storage = MmapStorage::open(&dir.path().join("wal.000"), 8).unwrap();

    storage.write(b"12345").unwrap();
    let err = storage.write(b"6789").unwrap_err();

    assert!(matches!(
        err,
        StorageError::Full {
            requested: 4,
            remaining: 3
        }
    ));
    assert!(storage.can_write(3));
    assert!(!storage.can_write(4));
}

#[test]
fn write_all_checks_whole_batch_first() {
    let dir = TempDir::new().unwrap();
    let mut storage = MmapStorage::open(&dir.path().join("wal.000"), 8).unwrap();

    let err = storage.write_all(&[b"1234", b"56789"]).unwrap_err();

    assert!(matches!(err, StorageError::Full { requested: 9, .. }));
    assert_eq!(storage.remaining(), Some(8));
}

#[test]
fn flush_records_data_length() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");
    let mut storage = MmapStorage::open(&path, 64).unwrap();

    storage.write(b"hello\n").unwrap();
    assert_eq!(storage.size().unwrap(), 0);
    storage.flush().unwrap();

    assert_eq!(storage.size().unwrap(), 6);
    assert_eq!(read_header(&path).data_length, 6);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 6], b"hello\n");
}

#[test]
fn reopen_resumes_after_flushed_data() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");
    {
        let mut storage = MmapStorage::open(&path, 64).unwrap();
        storage.write(b"kept\n").unwrap();
        storage.flush().unwrap();
        // never flushed, dropped on reopen
        storage.write(b"torn").unwrap();
    }

    let mut storage = MmapStorage::open(&path, 4096).unwrap();
    assert_eq!(storage.capacity(), 64);
    assert_eq!(storage.size().unwrap(), 5);

    storage.write(b"next\n").unwrap();
    storage.flush().unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 10], b"kept\nnext\n");
}

#[test]
fn rotate_seals_old_file_with_link() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("wal.000");
    let second = dir.path().join("wal.001");
    let mut storage = MmapStorage::open(&first, 32).unwrap();
    storage.write(b"a\n").unwrap();

    storage.rotate(&second).unwrap();

    let sealed = read_header(&first);
    assert_eq!(sealed.status, STATUS_CLOSED);
    assert_eq!(sealed.data_length, 2);
    assert_eq!(sealed.next_path.as_deref(), second.to_str());

    assert_eq!(storage.path(), second.as_path());
    assert_eq!(storage.capacity(), 32);
    assert_eq!(storage.size().unwrap(), 0);
}

#[test]
fn sealed_file_cannot_be_reopened_for_writing() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("wal.000");
    let mut storage = MmapStorage::open(&first, 32).unwrap();
    storage.rotate(&dir.path().join("wal.001")).unwrap();

    let err = MmapStorage::open(&first, 32).err().unwrap();
    assert!(matches!(err, StorageError::InvalidHeader(_)));
}

#[test]
fn close_marks_status_and_reopen_clears_it() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");
    let mut storage = MmapStorage::open(&path, 32).unwrap();
    storage.write(b"x\n").unwrap();
    storage.close().unwrap();

    assert_eq!(read_header(&path).status, STATUS_CLOSED);
    assert!(matches!(storage.write(b"y"), Err(StorageError::Closed)));

    let reopened = MmapStorage::open(&path, 32).unwrap();
    assert_eq!(reopened.size().unwrap(), 2);
    assert_eq!(read_header(&path).status, STATUS_OPEN);
}

#[test]
fn rotate_rejects_long_path() {
    let dir = TempDir::new().unwrap();
    let mut storage = MmapStorage::open(&dir.path().join("wal.000"), 32).unwrap();
    let long = dir.path().join("x".repeat(600));

    let err = storage.rotate(&long).unwrap_err();
    assert!(matches!(err, StorageError::PathTooLong(_)));
}

#[test]
fn short_file_is_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");
    std::fs::write(&path, b"not a wal").unwrap();

    let err = MmapStorage::open(&path, 32).err().unwrap();
    assert!(matches!(err, StorageError::InvalidHeader(_)));
}

#[test]
fn discard_rewinds_to_synced_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wal.000");
    let mut storage = MmapStorage::open(&path, 64).unwrap();
    storage.write(b"kept\n").unwrap();
    storage.flush().unwrap();
    storage.write(b"dropped\n").unwrap();

    storage.discard_unflushed().unwrap();
    assert_eq!(storage.remaining(), Some(64 - 5));
    storage.write(b"next\n").unwrap();
    storage.flush().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(read_header(&path).data_length, 10);
    assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 10], b"kept\nnext\n");
}
