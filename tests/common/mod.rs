//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use zipset::{ArchiveWriter, TransformHandler, WriteOptions};

/// Writes an archive at `dir/name` holding `entries`, optionally encrypted.
///
/// Returns the path of the finished archive.
pub fn write_archive(
    dir: &Path,
    name: &str,
    entries: &[(&str, &[u8])],
    password: Option<&str>,
) -> PathBuf {
    let mut options = WriteOptions::new();
    if let Some(pwd) = password {
        options = options.password(pwd);
    }
    let mut writer = ArchiveWriter::create(dir.join(name), options).expect("create archive");
    for (entry, data) in entries {
        writer.add_bytes(entry, data).expect("add entry");
    }
    writer.finish().expect("finish archive").archive_path
}

/// A dataset entry with three `Customer` rows keyed by `id`.
pub fn customers_xml() -> &'static str {
    r#"<?xml version="1.0" standalone="yes"?>
<NewDataSet>
  <Customer>
    <id>1</id>
    <name>Alice</name>
  </Customer>
  <Customer>
    <id>2</id>
    <name>Bob</name>
  </Customer>
  <Customer>
    <id>3</id>
    <name>Carol</name>
  </Customer>
</NewDataSet>
"#
}

/// Records every transform callback in arrival order.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub statements: Vec<(String, String)>,
    pub parsed: Vec<(String, String, usize)>,
    pub started: Vec<(String, u64)>,
    pub archives: Vec<PathBuf>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The statement texts without their table names.
    pub fn statement_texts(&self) -> Vec<&str> {
        self.statements.iter().map(|(_, s)| s.as_str()).collect()
    }
}

impl TransformHandler for RecordingHandler {
    fn on_statement_built(&mut self, table: &str, statement: &str) {
        self.statements.push((table.to_string(), statement.to_string()));
    }

    fn on_entry_parsed(&mut self, entry: &str, table: &str, record_count: usize) {
        self.parsed
            .push((entry.to_string(), table.to_string(), record_count));
    }

    fn on_entry_parse_started(&mut self, entry: &str, size: u64) {
        self.started.push((entry.to_string(), size));
    }

    fn on_archive_parsed(&mut self, archive: &Path) {
        self.archives.push(archive.to_path_buf());
    }
}

/// Collects every regular file below `dir` as (relative path, contents),
/// sorted by path. Separators are normalized to `/`.
pub fn read_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(dir)
                .expect("below root")
                .to_string_lossy()
                .replace('\\', "/");
            let data = std::fs::read(e.path()).expect("read file");
            (rel, data)
        })
        .collect();
    files.sort();
    files
}
