use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/jdk.xml")
}

fn installermsi() -> Command {
    Command::cargo_bin("installermsi").expect("binary built")
}

#[test]
fn stamps_fixture_descriptor() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("jdk-stamped.xml");

    installermsi()
        .arg("stamp")
        .arg(fixture())
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .success();

    let xml = fs::read_to_string(&out).expect("output written");
    assert!(xml.starts_with("<!-- OpenJDK installer descriptor -->"), "{xml}");
    assert!(!xml.contains("PLACEHOLDER_"), "{xml}");
    assert!(xml.contains(r#"Name="OpenJDK 21.0.2""#));
    assert!(xml.contains(r#"Version="21.0.2.0""#));
    assert!(xml.contains(r#"Name="CurrentVersion" Value="21.0.2""#));
    assert!(xml.contains(r#"Key="Software\JavaSoft\JDK\21.0.2""#));
    assert!(xml.contains(r#"Name="jdk-21""#));
    assert!(xml.contains("<!-- install directory -->"));
    assert!(xml.contains("<![CDATA[OpenJDK <runtime>]]>"));
}

#[test]
fn restamping_output_is_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let once = dir.path().join("once.xml");
    let twice = dir.path().join("twice.xml");

    installermsi()
        .arg("stamp")
        .arg(fixture())
        .arg(&once)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .success();
    installermsi()
        .arg("stamp")
        .arg(&once)
        .arg(&twice)
        .args(["22", "22.0.1", "22.0.1.0"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&once).expect("once"),
        fs::read_to_string(&twice).expect("twice")
    );
}

#[test]
fn wrong_argument_count_is_usage_error() {
    installermsi()
        .args(["stamp", "in.xml", "out.xml", "21", "21.0.2"])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Usage:"));
}

#[test]
fn unknown_subcommand_fails() {
    installermsi()
        .arg("frobnicate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn help_exits_zero() {
    installermsi()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stamp"))
        .stdout(predicate::str::contains("build-msi"));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.xml");
    let out = dir.path().join("out.xml");

    installermsi()
        .arg("stamp")
        .arg(&missing)
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("specified input file does not exist"));
    assert!(!out.exists());
}

#[test]
fn malformed_descriptor_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.xml");
    let out = dir.path().join("out.xml");
    fs::write(&input, "<Wix><Product></Wix>").expect("input");

    installermsi()
        .arg("stamp")
        .arg(&input)
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse descriptor"));
    assert!(!out.exists());
}

#[test]
fn missing_vendor_directory_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("jdk.xml");
    let out = dir.path().join("out.xml");
    let source = fs::read_to_string(fixture())
        .expect("fixture")
        .replace(r#"Id="dir_vendor""#, r#"Id="dir_other""#);
    fs::write(&input, source).expect("input");

    installermsi()
        .arg("stamp")
        .arg(&input)
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Child node not found, id: [dir_vendor]"));
    assert!(!out.exists());
}

#[test]
fn unwritable_output_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("missing").join("out.xml");

    installermsi()
        .arg("stamp")
        .arg(fixture())
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to write descriptor"));
    assert!(!dir.path().join("missing").exists());
}

#[test]
fn undeclared_entity_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("jdk.xml");
    let out = dir.path().join("out.xml");
    let source = fs::read_to_string(fixture())
        .expect("fixture")
        .replace("<![CDATA[OpenJDK <runtime>]]>", "a &bogus; b");
    fs::write(&input, source).expect("input");

    installermsi()
        .arg("stamp")
        .arg(&input)
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse descriptor"));
    assert!(!out.exists());
}

#[test]
fn missing_product_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("jdk.xml");
    let out = dir.path().join("out.xml");
    fs::write(&input, "<Wix><Fragment/></Wix>").expect("input");

    installermsi()
        .arg("stamp")
        .arg(&input)
        .arg(&out)
        .args(["21", "21.0.2", "21.0.2.0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Product node not found"));
}

#[test]
fn build_msi_requires_wxs() {
    installermsi()
        .arg("build-msi")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--wxs"));
}
