mod common;
use common::TestFixture;

#[test]
fn sessions_list_is_empty_before_any_ingest() {
    let fixture = TestFixture::new();
    let output = fixture.command().arg("sessions").arg("list").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("no sessions recorded"));
}

#[test]
fn sessions_list_and_show_reflect_a_seeded_session() {
    let fixture = TestFixture::new();
    let session = ward_testing::finished_excellent_session("s1", "demo-agent", 2);
    fixture.store().put_session(&serde_json::to_value(&session).unwrap()).unwrap();

    let list_output = fixture.command().arg("sessions").arg("list").output().unwrap();
    assert!(list_output.status.success());
    let listed = String::from_utf8_lossy(&list_output.stdout);
    assert!(listed.contains("s1"));
    assert!(listed.contains("demo-agent"));

    let show_output = fixture.command().arg("sessions").arg("show").arg("s1").output().unwrap();
    assert!(show_output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&show_output.stdout).unwrap();
    assert_eq!(value["session_id"], serde_json::json!("s1"));
    assert_eq!(value["overall_quality"], serde_json::json!("EXCELLENT"));
}

#[test]
fn sessions_show_reports_failure_for_unknown_id() {
    let fixture = TestFixture::new();
    fixture.command().arg("sessions").arg("show").arg("missing").assert().failure();
}
