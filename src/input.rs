//! Input loader: reads channel IDs from a CSV export.
//!
//! The first record is a header and is always discarded. The identifier is
//! the first field of each remaining record; blank or missing fields are
//! skipped. File order is kept and duplicates are passed through.

use crate::error::{Error, Result};
use crate::model::ChannelId;
use std::io::Read;
use std::path::Path;

/// Load channel IDs from the CSV file at `path`.
///
/// # Errors
///
/// Returns [`Error::SourceUnreadable`] if the file cannot be opened or a
/// record cannot be parsed.
pub fn load_channel_ids(path: &Path) -> Result<Vec<ChannelId>> {
    let reader = csv_builder()
        .from_path(path)
        .map_err(|source| Error::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    collect_ids(reader, path)
}

/// Load channel IDs from any reader. Same rules as [`load_channel_ids`];
/// `origin` is only used in error messages.
pub fn read_channel_ids<R: Read>(input: R, origin: &Path) -> Result<Vec<ChannelId>> {
    collect_ids(csv_builder().from_reader(input), origin)
}

fn csv_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn collect_ids<R: Read>(mut reader: csv::Reader<R>, origin: &Path) -> Result<Vec<ChannelId>> {
    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| Error::SourceUnreadable {
            path: origin.to_path_buf(),
            source,
        })?;
        if let Some(id) = record.get(0).and_then(ChannelId::parse) {
            ids.push(id);
        }
    }
    tracing::debug!(count = ids.len(), source = %origin.display(), "loaded channel ids");
    Ok(ids)
}
