mod common;
use common::TestFixture;
use std::time::{Duration, SystemTime};

#[test]
fn cleanup_removes_sessions_past_retention() {
    let fixture = TestFixture::new();
    let session = ward_testing::finished_excellent_session("old", "demo-agent", 1);
    let store = fixture.store();
    store.put_session(&serde_json::to_value(&session).unwrap()).unwrap();

    let path = fixture.data_dir().join("sessions").join("old.json");
    let stale = SystemTime::now() - Duration::from_secs(40 * 86_400);
    filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(stale)).unwrap();
    drop(store);

    fixture
        .command()
        .arg("cleanup")
        .arg("--retention-days")
        .arg("30")
        .assert()
        .success()
        .stdout(predicates::str::contains("removed 1 record"));

    fixture.command().arg("sessions").arg("show").arg("old").assert().failure();
}

#[test]
fn cleanup_keeps_recent_sessions() {
    let fixture = TestFixture::new();
    let session = ward_testing::finished_excellent_session("fresh", "demo-agent", 1);
    fixture.store().put_session(&serde_json::to_value(&session).unwrap()).unwrap();

    fixture
        .command()
        .arg("cleanup")
        .arg("--retention-days")
        .arg("30")
        .assert()
        .success()
        .stdout(predicates::str::contains("removed 0 record"));
}
