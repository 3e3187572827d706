use jiff::civil::date;
use pretty_assertions::assert_eq;
use youtube_collector::{CsvExport, Export, ResultSink, VideoRecord};

fn record(video_id: &str, title: &str, views: u64) -> VideoRecord {
    VideoRecord {
        channel_id: "UCabc".to_string(),
        channel_name: "Some Channel".to_string(),
        subscriber_count: 1234,
        video_id: video_id.to_string(),
        title: title.to_string(),
        published_at: "2024-02-29T18:30:00Z".to_string(),
        view_count: views,
        like_count: 56,
        comment_count: 7,
    }
}

#[test]
fn empty_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvExport::new(dir.path());

    let export = sink.emit(&[], date(2024, 3, 1)).unwrap();

    assert_eq!(export, Export::NoData);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn writes_header_and_rows_in_field_order() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvExport::new(dir.path());
    let records = vec![
        record("v1", "Plain title", 5000),
        record("v2", "Hello, \"world\"", 1000),
    ];

    let export = sink.emit(&records, date(2024, 3, 1)).unwrap();

    let path = dir.path().join("youtube_data_20240301.csv");
    assert_eq!(export, Export::Written(path.clone()));
    let contents = std::fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(contents.trim_end(), @r#"
    channel_id,channel_name,subscriber_count,video_id,title,published_at,view_count,like_count,comment_count
    UCabc,Some Channel,1234,v1,Plain title,2024-02-29T18:30:00Z,5000,56,7
    UCabc,Some Channel,1234,v2,"Hello, ""world""",2024-02-29T18:30:00Z,1000,56,7
    "#);
}

#[test]
fn same_day_export_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvExport::new(dir.path());
    let day = date(2024, 3, 1);

    sink.emit(&[record("first", "one", 1), record("second", "two", 2)], day)
        .unwrap();
    sink.emit(&[record("third", "three", 3)], day).unwrap();

    let contents = std::fs::read_to_string(sink.path_for(day)).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.contains(",third,"));
    assert!(!contents.contains(",first,"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn different_days_get_different_files() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CsvExport::new(dir.path()).with_prefix("stats");

    sink.emit(&[record("a", "a", 1)], date(2024, 3, 1)).unwrap();
    sink.emit(&[record("b", "b", 1)], date(2024, 3, 2)).unwrap();

    assert!(dir.path().join("stats_20240301.csv").exists());
    assert!(dir.path().join("stats_20240302.csv").exists());
}

#[test]
fn missing_output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("exports").join("youtube");
    let sink = CsvExport::new(&nested);

    let export = sink.emit(&[record("v1", "t", 1)], date(2024, 1, 1)).unwrap();

    assert_eq!(export, Export::Written(nested.join("youtube_data_20240101.csv")));
}
