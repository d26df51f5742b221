use chrono::{TimeZone, Utc};
use score_cli::history::JsonLinesHistory;
use score_cli::input::read_text;
use score_schemes::SchemeStore;
use score_session::{FixedClock, Session};

#[test]
fn appends_one_json_line_per_result() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.jsonl");
    let store = SchemeStore::builtin().unwrap();

    let at = Utc.with_ymd_and_hms(2024, 3, 2, 14, 5, 0).unwrap();
    let sink = JsonLinesHistory::open(&path).unwrap();
    assert_eq!(sink.path(), path.as_path());
    let mut session = Session::new()
        .with_history(sink)
        .with_clock(FixedClock(at));
    session.select_scheme(&store, "renal").unwrap();
    session.answer_raw("radius", "8").unwrap();
    session.answer_raw("exophytic", ">=50% exophytic").unwrap();
    session.answer_raw("nearness", "5").unwrap();
    session.answer_raw("anterior_posterior", "p").unwrap();
    session.answer_raw("location", "polar").unwrap();
    session.submit().unwrap();
    session.answer_raw("location", "interpolar").unwrap();
    session.rescore().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"]["outcome"]["score"], 7);
    assert_eq!(lines[1]["result"]["outcome"]["score"], 9);
    assert_eq!(lines[1]["timestamp"], "2024-03-02T14:05:00Z");
    assert_eq!(lines[1]["answers"]["location"]["choice"], "interpolar");
    assert_eq!(lines[1]["result"]["outcome"]["bucket"], "moderate complexity");
}

#[test]
fn reopening_appends_instead_of_truncating() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.jsonl");
    std::fs::write(&path, "{}\n").unwrap();
    let store = SchemeStore::builtin().unwrap();

    let mut session = Session::new().with_history(JsonLinesHistory::open(&path).unwrap());
    session.select_scheme(&store, "tnm-adrenal").unwrap();
    session.answer_raw("t", "T3").unwrap();
    session.answer_raw("n", "N0").unwrap();
    session.answer_raw("m", "M0").unwrap();
    assert_eq!(session.submit().unwrap().stage(), Some("III"));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents.lines().count(), 2);
    assert!(contents.starts_with("{}\n"));
}

#[test]
fn reads_report_text_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    std::fs::write(&path, "Tumor size 4.2 cm\n").unwrap();
    assert_eq!(read_text(Some(&path)).unwrap(), "Tumor size 4.2 cm\n");
}
