use std::fs;
use std::path::Path;

use score_schemes::hash::sha256_hex;
use score_schemes::{DoctorReport, SchemeError, SchemeStore};

const GRADE: &str = r#"[scheme]
id = "grade"
name = "Two-tier grade"
version = "1"
category = "test"
strategy = "additive"

[[fields]]
id = "grade"
type = "choice"
options = [{ value = "low" }, { value = "high" }]

[additive]
min = 1
max = 2

[[additive.points]]
field = "grade"
options = { low = 1, high = 2 }
"#;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn write_manifest(dir: &Path, entries: &[(&str, &str)]) {
    let mut manifest = String::from(
        "[manifest]\nschema = \"score-report.scheme-manifest\"\nschema_version = 1\n",
    );
    for (path, kind) in entries {
        let sha = sha256_hex(&fs::read(dir.join(path)).unwrap());
        manifest.push_str(&format!(
            "\n[[files]]\npath = \"{path}\"\nsha256 = \"{sha}\"\nkind = \"{kind}\"\n"
        ));
    }
    write(&dir.join("manifest.toml"), &manifest);
}

#[test]
fn loads_verified_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("grade.toml"), GRADE);
    write(&dir.path().join("notes/README.txt"), "local schemes");
    write_manifest(dir.path(), &[("grade.toml", "scheme"), ("notes/README.txt", "notes")]);

    let (store, summary) = SchemeStore::load_dir(dir.path()).unwrap();
    assert_eq!(summary.file_count, 2);
    assert_eq!(summary.scheme_count, 1);
    assert!(store.get_scheme("grade").is_ok());
}

#[test]
fn rejects_tampered_file() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("grade.toml"), GRADE);
    write_manifest(dir.path(), &[("grade.toml", "scheme")]);
    write(&dir.path().join("grade.toml"), &GRADE.replace("high = 2", "high = 9"));

    let err = SchemeStore::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SchemeError::Sha256Mismatch { .. }), "{err}");
}

#[test]
fn rejects_unlisted_file() {
    let dir = tempfile::tempdir().unwrap();
    write(&dir.path().join("grade.toml"), GRADE);
    write_manifest(dir.path(), &[("grade.toml", "scheme")]);
    write(&dir.path().join("stray.toml"), GRADE);

    let err = SchemeStore::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, SchemeError::UnexpectedFile { .. }), "{err}");
}

#[test]
fn rejects_inconsistent_scheme_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let broken = GRADE.replace("options = { low = 1, high = 2 }", "options = { low = 1, medium = 2 }");
    write(&dir.path().join("grade.toml"), &broken);
    write_manifest(dir.path(), &[("grade.toml", "scheme")]);

    let err = SchemeStore::load_dir(dir.path()).unwrap_err();
    match err {
        SchemeError::Inconsistent { scheme, issues } => {
            assert_eq!(scheme, "grade");
            assert_eq!(
                issues,
                vec![
                    "points reference undeclared option medium of grade".to_string(),
                    "option high of grade has no points".to_string(),
                ]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut builder = SchemeStore::builder();
    builder.add_toml(GRADE, "a.toml").unwrap();
    let err = builder.add_toml(GRADE, "b.toml").unwrap_err();
    assert!(matches!(err, SchemeError::DuplicateScheme { ref id } if id == "grade"));
}

#[test]
fn doctor_report_is_stable() {
    let mut builder = SchemeStore::builder();
    builder.add_toml(GRADE, "grade.toml").unwrap();
    let store = builder.build();
    let report = DoctorReport::for_store(&store, "fixture", 1);
    insta::assert_json_snapshot!(report, @r#"
    {
      "schema": "score-report.schemes-doctor",
      "schema_version": 1,
      "source": "fixture",
      "counts": {
        "files": 1,
        "schemes": 1,
        "fields": 1,
        "extractable_fields": 0,
        "by_strategy": {
          "additive": 1
        },
        "by_field_kind": {
          "choice": 1
        }
      },
      "schemes": [
        {
          "id": "grade",
          "name": "Two-tier grade",
          "version": "1",
          "category": "test",
          "strategy": "additive",
          "required_fields": 1
        }
      ]
    }
    "#);
}
