//! Pull scanner turning a dataset XML stream into statements.
//!
//! The scanner recognizes three kinds of elements:
//!
//! - the dataset wrapper (ignored, its close ends the entry),
//! - the table element (the first non-wrapper element; each occurrence is one
//!   record),
//! - anything else inside a record (a field, whose text is the value).
//!
//! The stream is read event by event; nothing beyond the current record is
//! kept in memory.

use std::io::{self, BufRead};
use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::Event;
use quick_xml::name::QName;

use super::TransformHandler;
use super::options::TransformOptions;
use super::statement::StatementBuilder;
use crate::{Error, Result};

/// One scan step with the event data copied out of the read buffer.
enum Step {
    Open(String),
    Empty(String),
    Close(String),
    Text(String),
    Other,
    Eof,
}

/// Scans the records of one entry.
pub struct RecordScanner<'o, R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    entry: String,
    options: &'o TransformOptions,
    table: Option<String>,
    builder: StatementBuilder,
    in_record: bool,
    records: usize,
}

impl<'o, R: BufRead> RecordScanner<'o, R> {
    /// Creates a scanner over the decompressed content of `entry`.
    pub fn new(source: R, entry: &str, options: &'o TransformOptions) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            entry: entry.to_string(),
            options,
            table: None,
            builder: StatementBuilder::new(),
            in_record: false,
            records: 0,
        }
    }

    /// Table name captured from the first record, if any.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Scans to the end of the entry and returns the number of statements
    /// emitted.
    ///
    /// # Errors
    ///
    /// [`Error::Xml`] for malformed XML, [`Error::Io`] when the entry stream
    /// fails, and [`Error::MalformedRecord`] when the entry ends inside a record
    /// (unless truncation is tolerated).
    pub fn run<H: TransformHandler + ?Sized>(&mut self, handler: &mut H) -> Result<usize> {
        loop {
            match self.next_step()? {
                Step::Open(name) => {
                    if self.options.is_dataset_root(&name) {
                        continue;
                    }
                    if self.opens_record(&name) {
                        self.begin_record(name);
                    } else if !self.read_field(&name)? {
                        return self.truncated();
                    }
                }
                Step::Empty(name) => {
                    if self.options.is_dataset_root(&name) {
                        self.close_dataset(handler);
                    } else if self.opens_record(&name) {
                        self.begin_record(name);
                        self.close_record(handler);
                    } else if self.in_record && !self.options.is_primary_key(&name) {
                        self.builder.push_field(&name, "");
                    }
                }
                Step::Close(name) => {
                    if self.options.is_dataset_root(&name) {
                        self.close_dataset(handler);
                    } else if self.in_record && self.table.as_deref() == Some(name.as_str()) {
                        self.close_record(handler);
                    }
                }
                Step::Text(_) | Step::Other => {}
                Step::Eof => {
                    if self.in_record {
                        return self.truncated();
                    }
                    return Ok(self.records);
                }
            }
        }
    }

    fn opens_record(&self, name: &str) -> bool {
        match &self.table {
            None => true,
            Some(table) => table == name,
        }
    }

    fn begin_record(&mut self, name: String) {
        let table = self.table.get_or_insert(name);
        self.builder.begin(table);
        self.in_record = true;
    }

    fn close_record<H: TransformHandler + ?Sized>(&mut self, handler: &mut H) {
        let statement = self.builder.finish();
        self.in_record = false;
        self.records += 1;
        let table = self.table.as_deref().unwrap_or_default();
        handler.on_statement_built(table, &statement);
    }

    fn close_dataset<H: TransformHandler + ?Sized>(&mut self, handler: &mut H) {
        let table = self.table.as_deref().unwrap_or_default();
        log::debug!(
            "Parsed entry '{}': {} records of '{}'",
            self.entry,
            self.records,
            table
        );
        handler.on_entry_parsed(&self.entry, table, self.records);
    }

    /// Consumes one field element. Returns false if the entry ended first.
    fn read_field(&mut self, name: &str) -> Result<bool> {
        let Some(value) = self.read_text_to_close()? else {
            return Ok(false);
        };
        if !self.in_record {
            log::debug!("Ignoring element '{}' outside a record in '{}'", name, self.entry);
        } else if !self.options.is_primary_key(name) {
            self.builder.push_field(name, &value);
        }
        Ok(true)
    }

    /// Collects the text up to the close of the current element, including
    /// text of nested elements. Returns `None` at end of input.
    fn read_text_to_close(&mut self) -> Result<Option<String>> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.next_step()? {
                Step::Text(t) => text.push_str(&t),
                Step::Open(_) => depth += 1,
                Step::Close(_) if depth == 0 => return Ok(Some(text)),
                Step::Close(_) => depth -= 1,
                Step::Empty(_) | Step::Other => {}
                Step::Eof => return Ok(None),
            }
        }
    }

    fn truncated(&mut self) -> Result<usize> {
        let table = self.table.clone();
        self.builder.clear();
        self.in_record = false;
        if self.options.tolerate_truncation {
            log::warn!(
                "Entry '{}' ended inside a record of '{}'; record dropped",
                self.entry,
                table.as_deref().unwrap_or_default()
            );
            return Ok(self.records);
        }
        Err(Error::MalformedRecord {
            entry: self.entry.clone(),
            table,
            reason: "entry ended before the record was closed",
        })
    }

    fn next_step(&mut self) -> Result<Step> {
        self.buf.clear();
        let step = match self.reader.read_event_into(&mut self.buf) {
            Ok(Event::Start(e)) => Step::Open(element_name(e.name())),
            Ok(Event::Empty(e)) => Step::Empty(element_name(e.name())),
            Ok(Event::End(e)) => Step::Close(element_name(e.name())),
            Ok(Event::Text(t)) => match t.unescape() {
                Ok(text) => Step::Text(text.into_owned()),
                Err(e) => return Err(xml_error(&self.entry, e.into())),
            },
            Ok(Event::CData(c)) => Step::Text(String::from_utf8_lossy(&c.into_inner()).into_owned()),
            Ok(Event::Eof) => Step::Eof,
            Ok(_) => Step::Other,
            Err(e) => return Err(xml_error(&self.entry, e)),
        };
        Ok(step)
    }
}

fn element_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

/// Stream failures surface as [`Error::Io`] so the caller can tell a failing
/// decryption apart from malformed XML.
fn xml_error(entry: &str, error: quick_xml::Error) -> Error {
    match error {
        quick_xml::Error::Io(source) => Error::Io(
            Arc::try_unwrap(source).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared.to_string())),
        ),
        other => Error::Xml {
            entry: entry.to_string(),
            source: other,
        },
    }
}
