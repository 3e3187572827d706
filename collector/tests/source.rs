use pretty_assertions::assert_eq;
use std::path::Path;
use youtube_collector::{ChannelSource, ConfigError, CsvChannelSource};

fn write(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("channels.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn reads_ids_in_order_keeping_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "name,channel_id\nfirst,UC1\nsecond, UC2 \nthird,UC1\n",
    );

    let ids = CsvChannelSource::new(&path).channel_ids().unwrap();

    assert_eq!(ids, vec!["UC1", "UC2", "UC1"]);
}

#[test]
fn blank_cells_and_short_rows_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "channel_id,note\nUC1,x\n,empty\nonly\n   ,y\nUC2\n");

    let ids = CsvChannelSource::new(&path).channel_ids().unwrap();

    assert_eq!(ids, vec!["UC1", "only", "UC2"]);
}

#[test]
fn missing_column_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "id,name\nUC1,a\n");

    let err = CsvChannelSource::new(&path).channel_ids().unwrap_err();

    assert!(
        matches!(&err, ConfigError::MissingColumn { column, .. } if column == "channel_id"),
        "{err:?}"
    );
    assert!(err.to_string().ends_with("has no `channel_id` column"), "{err}");
}

#[test]
fn custom_column_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "Channel\nUCx\n");

    let ids = CsvChannelSource::new(&path)
        .with_column("Channel")
        .channel_ids()
        .unwrap();

    assert_eq!(ids, vec!["UCx"]);
}

#[test]
fn unreadable_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = CsvChannelSource::new(dir.path().join("absent.csv"))
        .channel_ids()
        .unwrap_err();

    assert!(matches!(err, ConfigError::ReadSource { .. }), "{err:?}");
}
