//! Integration tests for the CSV input loader.

use resubscribe::error::Error;
use resubscribe::input::{load_channel_ids, read_channel_ids};
use std::path::Path;

fn load(csv: &str) -> Vec<String> {
    read_channel_ids(csv.as_bytes(), Path::new("inline.csv"))
        .unwrap()
        .into_iter()
        .map(|id| id.to_string())
        .collect()
}

#[test]
fn skips_header_and_keeps_order() {
    let csv = "Channel Id,Channel Url,Channel Title\n\
               UCz,http://www.youtube.com/channel/UCz,Zed\n\
               UCa,http://www.youtube.com/channel/UCa,Alpha\n";
    assert_eq!(load(csv), vec!["UCz", "UCa"]);
}

#[test]
fn header_is_dropped_even_if_it_looks_like_an_id() {
    assert_eq!(load("UCheader\nUC1\n"), vec!["UC1"]);
}

#[test]
fn trims_and_drops_blank_first_fields() {
    let csv = "id,title\n  UC1  ,One\n,Nameless\n   ,Spaces\nUC2,Two\n";
    assert_eq!(load(csv), vec!["UC1", "UC2"]);
}

#[test]
fn keeps_duplicates_and_tolerates_ragged_rows() {
    let csv = "id,url,title\nUC1\nUC2,u,t,extra\nUC1,u,t\n";
    assert_eq!(load(csv), vec!["UC1", "UC2", "UC1"]);
}

#[test]
fn handles_quoted_fields() {
    let csv = "id,title\n\"UC1\",\"Title, with comma\"\n";
    assert_eq!(load(csv), vec!["UC1"]);
}

#[test]
fn header_only_file_yields_nothing() {
    assert!(load("Channel Id,Channel Url,Channel Title\n").is_empty());
}

#[test]
fn loads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("subscriptions.csv");
    std::fs::write(&path, "Channel Id\nUC1\nUC2\n").unwrap();

    let ids = load_channel_ids(&path).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1].as_str(), "UC2");
}

#[test]
fn missing_file_is_source_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_channel_ids(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::SourceUnreadable { .. }));
}

#[test]
fn invalid_utf8_is_source_unreadable() {
    let bytes: &[u8] = b"id\n\xff\xfe\n";
    let err = read_channel_ids(bytes, Path::new("bad.csv")).unwrap_err();
    assert!(matches!(err, Error::SourceUnreadable { .. }));
}
