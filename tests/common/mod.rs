//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// First bytes of a PNG file; not valid UTF-8.
pub const PNG_HEADER: [u8; 10] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

/// Builds an archive from `(entry name, raw bytes)` pairs.
pub fn build_raw_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Builds a `.sketch` archive from `(entry name, JSON)` pairs.
pub fn build_archive(entries: &[(&str, Value)]) -> Vec<u8> {
    let encoded: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, value)| (*name, serde_json::to_vec(value).unwrap()))
        .collect();
    let raw: Vec<(&str, &[u8])> = encoded
        .iter()
        .map(|(name, data)| (*name, data.as_slice()))
        .collect();
    build_raw_archive(&raw)
}

pub fn document_json() -> Value {
    json!({ "_class": "document", "do_objectID": "D1" })
}

pub fn page_json() -> Value {
    json!({
        "_class": "page",
        "do_objectID": "P1",
        "layers": [{
            "_class": "symbolMaster",
            "do_objectID": "S1",
            "name": "Btn",
            "frame": { "x": 0, "y": 0, "width": 10, "height": 10 }
        }]
    })
}

/// The D1 / P1 / S1 document: no `meta.json`, one page holding one symbol.
pub fn sample_archive() -> Vec<u8> {
    build_archive(&[("document.json", document_json()), ("pages/p1.json", page_json())])
}

/// Writes `bytes` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
