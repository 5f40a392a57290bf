//! Dataset-to-statement tests driven through real archives.

mod common;

use common::{RecordingHandler, customers_xml, write_archive};
use tempfile::TempDir;
use zipset::transform::statement_fn;
use zipset::{Error, ImportResult, TransformOptions, transform};

fn archive_with(temp: &TempDir, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
    write_archive(temp.path(), "dataset.zip", entries, None)
}

#[test]
fn test_customers_to_statements() {
    let temp = TempDir::new().unwrap();
    let xml = customers_xml();
    let archive = archive_with(&temp, &[("entry.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    let options = TransformOptions::new().primary_key("id");
    let result = transform(&archive, options, &mut handler).unwrap();

    assert_eq!(result, ImportResult::Success);
    assert_eq!(
        handler.statement_texts(),
        vec![
            "INSERT INTO Customer (name) VALUES ( 'Alice' ); ",
            "INSERT INTO Customer (name) VALUES ( 'Bob' ); ",
            "INSERT INTO Customer (name) VALUES ( 'Carol' ); ",
        ]
    );
    assert!(handler.statements.iter().all(|(t, _)| t == "Customer"));
    assert_eq!(
        handler.parsed,
        vec![("entry.xml".to_string(), "Customer".to_string(), 3)]
    );
    assert_eq!(
        handler.started,
        vec![("entry.xml".to_string(), xml.len() as u64)]
    );
    assert_eq!(handler.archives, vec![archive]);
}

#[test]
fn test_without_primary_key_all_columns() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet><Order><id>7</id><item>pen</item></Order></NewDataSet>";
    let archive = archive_with(&temp, &[("orders.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    transform(&archive, TransformOptions::new(), &mut handler).unwrap();
    assert_eq!(
        handler.statement_texts(),
        vec!["INSERT INTO Order (id, item) VALUES ( '7', 'pen' ); "]
    );
}

#[test]
fn test_empty_and_multiline_values() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet>\
        <Row><a>   </a><b>4\n2</b><c/><d>x &amp; y</d></Row>\
        </NewDataSet>";
    let archive = archive_with(&temp, &[("rows.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    transform(&archive, TransformOptions::new(), &mut handler).unwrap();
    assert_eq!(
        handler.statement_texts(),
        vec!["INSERT INTO Row (a, b, c, d) VALUES ( NULL, 42, NULL, 'x & y' ); "]
    );
}

#[test]
fn test_multiple_entries_in_archive_order() {
    let temp = TempDir::new().unwrap();
    let first = "<NewDataSet><A><v>1</v></A></NewDataSet>";
    let second = "<NewDataSet><B><v>2</v></B><B><v>3</v></B></NewDataSet>";
    let archive = archive_with(
        &temp,
        &[
            ("one.xml", first.as_bytes()),
            ("notes.txt", b"<NewDataSet><Z><v>9</v></Z></NewDataSet>"),
            ("two.xml", second.as_bytes()),
        ],
    );

    let mut handler = RecordingHandler::new();
    let result = transform(&archive, TransformOptions::new(), &mut handler).unwrap();
    assert_eq!(result, ImportResult::Success);
    assert_eq!(
        handler.parsed,
        vec![
            ("one.xml".to_string(), "A".to_string(), 1),
            ("two.xml".to_string(), "B".to_string(), 2),
        ]
    );
    let started: Vec<&str> = handler.started.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(started, vec!["one.xml", "two.xml"]);
}

#[test]
fn test_custom_extension() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet><T><v>1</v></T></NewDataSet>";
    let archive = archive_with(
        &temp,
        &[("a.xml", xml.as_bytes()), ("b.data", xml.as_bytes())],
    );

    let mut handler = RecordingHandler::new();
    let options = TransformOptions::new().extension(".data");
    transform(&archive, options, &mut handler).unwrap();
    let started: Vec<&str> = handler.started.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(started, vec!["b.data"]);
}

#[test]
fn test_truncated_record_is_error() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet><T><v>1</v></T><T><v>2</v>";
    let archive = archive_with(&temp, &[("cut.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    let err = transform(&archive, TransformOptions::new(), &mut handler).unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { .. }), "{:?}", err);
    assert_eq!(handler.statements.len(), 1);
}

#[test]
fn test_truncated_record_tolerated() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet><T><v>1</v></T><T><v>2</v>";
    let archive = archive_with(&temp, &[("cut.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    let options = TransformOptions::new().tolerate_truncation(true);
    let result = transform(&archive, options, &mut handler).unwrap();
    assert_eq!(result, ImportResult::Success);
    assert_eq!(
        handler.statement_texts(),
        vec!["INSERT INTO T (v) VALUES ( '1' ); "]
    );
}

#[test]
fn test_malformed_xml_is_error() {
    let temp = TempDir::new().unwrap();
    let xml = "<NewDataSet><T><v>1</w></T></NewDataSet>";
    let archive = archive_with(&temp, &[("bad.xml", xml.as_bytes())]);

    let mut handler = RecordingHandler::new();
    let err = transform(&archive, TransformOptions::new(), &mut handler).unwrap_err();
    assert!(matches!(err, Error::Xml { .. }), "{:?}", err);
}

#[test]
fn test_missing_archive_not_run() {
    let temp = TempDir::new().unwrap();
    let mut handler = RecordingHandler::new();
    let result = transform(
        temp.path().join("absent.zip"),
        TransformOptions::new(),
        &mut handler,
    )
    .unwrap();
    assert_eq!(result, ImportResult::NotRun);
    assert!(handler.archives.is_empty());
}

#[test]
fn test_closure_handler() {
    let temp = TempDir::new().unwrap();
    let archive = archive_with(&temp, &[("entry.xml", customers_xml().as_bytes())]);

    let mut names = Vec::new();
    let mut handler = statement_fn(|table: &str, statement: &str| {
        names.push(format!("{}:{}", table, statement.len()));
    });
    let options = TransformOptions::new().primary_keys(["ID"]);
    transform(&archive, options, &mut handler).unwrap();
    drop(handler);
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|n| n.starts_with("Customer:")));
}
