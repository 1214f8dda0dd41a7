mod common;
use common::TestFixture;
use predicates::str::contains;

#[test]
fn config_get_returns_defaults_on_first_run() {
    let fixture = TestFixture::new();
    let output = fixture.command().arg("config").arg("get").output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["max_steps"], serde_json::json!(50));
}

#[test]
fn config_set_then_get_roundtrips() {
    let fixture = TestFixture::new();
    fixture.command().arg("config").arg("set").arg("max_steps").arg("80").assert().success();

    let output = fixture.command().arg("config").arg("get").output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["max_steps"], serde_json::json!(80));
}

#[test]
fn config_set_rejects_unknown_key() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("config")
        .arg("set")
        .arg("not_a_real_key")
        .arg("1")
        .assert()
        .failure()
        .stderr(contains("unrecognized config key"));
}

#[test]
fn config_set_rejects_invalid_value() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("config")
        .arg("set")
        .arg("max_steps")
        .arg("0")
        .assert()
        .failure();
}
