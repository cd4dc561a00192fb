//! Integration tests for the log: append/read routing, roll-over,
//! durability across reopen, truncation, and the concatenated reader.

use std::io::Read;

use bytes::Bytes;
use prost::Message;
use tempfile::TempDir;

use seglog_storage::index::ENT_WIDTH;
use seglog_storage::store::LEN_WIDTH;
use seglog_storage::{Config, Error, Log, Record, SegmentConfig};

fn record() -> Record {
    Record::new(Bytes::from("hello world"))
}

/// Config capping each segment at one index entry, so every append rolls.
fn one_record_per_segment() -> Config {
    Config {
        segment: SegmentConfig {
            max_index_bytes: ENT_WIDTH,
            ..SegmentConfig::default()
        },
    }
}

#[test]
fn append_read() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), Config::default()).expect("open");

    let offset = log.append(record()).expect("append");
    assert_eq!(offset, 0);

    let got = log.read(offset).expect("read");
    assert_eq!(got.value, record().value);
    assert_eq!(got.offset, 0);

    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), 0);
}

#[test]
fn offsets_are_monotonic() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), Config::default()).expect("open");

    for want in 0..10 {
        let offset = log.append(record()).expect("append");
        assert_eq!(offset, want);
    }
    assert_eq!(log.highest_offset(), 9);
}

#[test]
fn offset_out_of_range() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), Config::default()).expect("open");

    match log.read(1) {
        Err(Error::OffsetOutOfRange(offset)) => assert_eq!(offset, 1),
        other => panic!("expected out-of-range, got {other:?}"),
    }

    log.append(record()).expect("append");
    assert!(matches!(log.read(2), Err(Error::OffsetOutOfRange(2))));
    // The appended record itself is in range.
    assert!(log.read(0).is_ok());
}

#[test]
fn init_with_existing_segments() {
    let dir = TempDir::new().expect("tempdir");
    let config = one_record_per_segment();

    let payloads: Vec<Bytes> = (0..3)
        .map(|i| Bytes::from(format!("record-{i}")))
        .collect();

    let log = Log::open(dir.path(), config.clone()).expect("open");
    for payload in &payloads {
        log.append(Record::new(payload.clone())).expect("append");
    }
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), 2);
    log.close().expect("close");

    let log = Log::open(dir.path(), config).expect("reopen");
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), 2);
    for (i, payload) in payloads.iter().enumerate() {
        let got = log.read(i as u64).expect("read");
        assert_eq!(&got.value, payload);
        assert_eq!(got.offset, i as u64);
    }
}

#[test]
fn rolls_one_segment_per_record() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), one_record_per_segment()).expect("open");

    for want in 0..3 {
        let offset = log.append(record()).expect("append");
        assert_eq!(offset, want);
    }
    for offset in 0..3 {
        assert_eq!(log.read(offset).expect("read").value, record().value);
    }

    // One store/index pair per base offset 0, 1, 2.
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "0.index", "0.store", "1.index", "1.store", "2.index", "2.store"
        ]
    );
}

#[test]
fn index_limit_bounds_records_per_segment() {
    let dir = TempDir::new().expect("tempdir");
    let config = Config {
        segment: SegmentConfig {
            max_index_bytes: ENT_WIDTH * 3,
            ..SegmentConfig::default()
        },
    };
    let log = Log::open(dir.path(), config).expect("open");

    for _ in 0..7 {
        log.append(record()).expect("append");
    }

    // Three records per segment: bases 0, 3 and 6.
    let mut bases: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .filter_map(|e| {
            let path = e.expect("entry").path();
            path.extension()
                .is_some_and(|ext| ext == "store")
                .then(|| path.file_stem().unwrap().to_string_lossy().into_owned())
        })
        .collect();
    bases.sort();
    assert_eq!(bases, vec!["0", "3", "6"]);
}

#[test]
fn foreign_files_are_ignored_on_open() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("notes.txt"), b"not a segment").expect("write");

    let log = Log::open(dir.path(), Config::default()).expect("open");
    assert_eq!(log.lowest_offset(), 0);
    assert_eq!(log.highest_offset(), 0);
    assert!(matches!(log.read(5), Err(Error::OffsetOutOfRange(5))));
}

#[test]
fn truncate_drops_the_prefix() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), one_record_per_segment()).expect("open");

    for _ in 0..3 {
        log.append(record()).expect("append");
    }

    log.truncate(1).expect("truncate");

    assert!(matches!(log.read(0), Err(Error::OffsetOutOfRange(0))));
    assert_eq!(log.read(1).expect("read").value, record().value);
    assert_eq!(log.read(2).expect("read").value, record().value);
    assert_eq!(log.lowest_offset(), 1);
    assert_eq!(log.highest_offset(), 2);
}

#[test]
fn truncate_keeps_the_active_segment() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), one_record_per_segment()).expect("open");

    for _ in 0..3 {
        log.append(record()).expect("append");
    }

    // Past the highest offset: everything removable goes, but the log still
    // has a tail to append into.
    log.truncate(100).expect("truncate");
    assert_eq!(log.lowest_offset(), 2);

    let offset = log.append(record()).expect("append");
    assert_eq!(offset, 3);
}

#[test]
fn reader_concatenates_raw_store_bytes() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), Config::default()).expect("open");

    log.append(record()).expect("append");

    let mut bytes = Vec::new();
    log.reader()
        .read_to_end(&mut bytes)
        .expect("read_to_end");

    // One frame: 8-byte big-endian length, then the encoded record.
    let mut len = [0u8; LEN_WIDTH as usize];
    len.copy_from_slice(&bytes[..LEN_WIDTH as usize]);
    let payload = &bytes[LEN_WIDTH as usize..];
    assert_eq!(u64::from_be_bytes(len) as usize, payload.len());

    let got = Record::decode(payload).expect("decode");
    assert_eq!(got.value, record().value);
    assert_eq!(got.offset, 0);
}

#[test]
fn reader_spans_segments() {
    let dir = TempDir::new().expect("tempdir");
    let log = Log::open(dir.path(), one_record_per_segment()).expect("open");

    for _ in 0..3 {
        log.append(record()).expect("append");
    }

    let mut bytes = Vec::new();
    log.reader()
        .read_to_end(&mut bytes)
        .expect("read_to_end");

    // Walk the frames back out: three records across three stores.
    let mut decoded = Vec::new();
    let mut at = 0;
    while at < bytes.len() {
        let mut len = [0u8; LEN_WIDTH as usize];
        len.copy_from_slice(&bytes[at..at + LEN_WIDTH as usize]);
        at += LEN_WIDTH as usize;

        let frame_len = u64::from_be_bytes(len) as usize;
        decoded.push(Record::decode(&bytes[at..at + frame_len]).expect("decode"));
        at += frame_len;
    }

    assert_eq!(decoded.len(), 3);
    for (i, got) in decoded.iter().enumerate() {
        assert_eq!(got.offset, i as u64);
        assert_eq!(got.value, record().value);
    }
}

#[test]
fn remove_deletes_the_directory() {
    let parent = TempDir::new().expect("tempdir");
    let dir = parent.path().join("log");

    let log = Log::open(&dir, Config::default()).expect("open");
    log.append(record()).expect("append");
    log.remove().expect("remove");

    assert!(!dir.exists());
}
