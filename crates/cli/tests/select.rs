use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const SCHEMA_JSON: &str = r#"[
    {
        "table": "students",
        "description": "Student enrollment and demographic records.",
        "columns": ["students.id", "students.name"],
        "tags": ["enrollment", "student records"],
        "category": "student information"
    },
    {
        "table": "grades",
        "description": "Assessment scores per student and subject.",
        "columns": ["grades.student_id", "grades.score"],
        "tags": ["assessment", "report cards"],
        "category": "academic records"
    },
    {
        "table": "attendance",
        "description": "Daily presence and absence records.",
        "columns": ["attendance.student_id", "attendance.date"],
        "tags": ["attendance", "behavior"],
        "category": "attendance tracking"
    }
]"#;

fn insight(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("insight").expect("binary");
    cmd.current_dir(workdir)
        .env("INSIGHT_EMBEDDING_MODE", "stub")
        .env("INSIGHT_STUB_DIMENSION", "16");
    cmd
}

fn setup_store(root: &Path) {
    fs::write(root.join("schema.json"), SCHEMA_JSON).unwrap();
    insight(root)
        .args(["embed", "--schema", "schema.json", "--output", "embeddings.json"])
        .assert()
        .success();
}

#[test]
fn select_returns_requested_number_of_tables_as_json() {
    let temp = tempdir().unwrap();
    setup_store(temp.path());

    let output = insight(temp.path())
        .args([
            "select",
            "--store",
            "embeddings.json",
            "--query",
            "which students were absent",
            "-k",
            "2",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);

    let known = ["students", "grades", "attendance"];
    let mut previous = f64::INFINITY;
    for row in rows {
        let table = row["table"].as_str().expect("table name");
        assert!(known.contains(&table), "unexpected table {table}");
        let score = row["score"].as_f64().expect("score");
        assert!(score <= previous, "scores must descend");
        previous = score;
    }
}

#[test]
fn select_is_deterministic_across_runs() {
    let temp = tempdir().unwrap();
    setup_store(temp.path());

    let run = || {
        insight(temp.path())
            .args([
                "select",
                "--store",
                "embeddings.json",
                "--query",
                "grades by subject",
                "--json",
            ])
            .output()
            .unwrap()
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn select_accepts_a_database_directory() {
    let temp = tempdir().unwrap();
    setup_store(temp.path());
    // An unrelated export next to the embedding file must not confuse
    // discovery.
    fs::write(temp.path().join("tables_summary.json"), "[]").unwrap();

    insight(temp.path())
        .args(["select", "--store", ".", "--query", "student names", "--json"])
        .assert()
        .success();
}

#[test]
fn select_rejects_an_empty_query() {
    let temp = tempdir().unwrap();
    setup_store(temp.path());

    insight(temp.path())
        .args(["select", "--store", "embeddings.json", "--query", "   "])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Query must not be empty"));
}

#[test]
fn select_fails_cleanly_on_a_malformed_store() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("broken.json"), "{not json").unwrap();

    insight(temp.path())
        .args(["select", "--store", "broken.json", "--query", "anything"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Malformed"));
}

#[test]
fn inspect_reports_count_and_dimension() {
    let temp = tempdir().unwrap();
    setup_store(temp.path());

    insight(temp.path())
        .args(["inspect", "--store", "embeddings.json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("3 records, dimension 16"));
}
