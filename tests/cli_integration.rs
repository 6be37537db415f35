use std::io::Write;
use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_boolean-parser"))
        .args(args)
        .output()
        .expect("failed to execute process")
}

#[test]
fn prints_repr_and_params() {
    let output = run(&["--params", "x > 5 or y < 3 and not z == 2"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec!["or_(x>5, and_(y<3, not_(z==2)))", "x", "y", "z"]
    );
}

#[test]
fn lowers_against_schema_file() {
    let mut schema = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(
        schema,
        "models:\n  - table: people\n    columns:\n      - {{ name: name, type: text }}\n      - {{ name: age, type: int }}"
    )
    .unwrap();
    let schema_path = schema.path().to_str().unwrap();

    let output = run(&["--schema", schema_path, "name = jo* and age >= 18"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim_end(),
        "lower(people.name) LIKE lower('jo%') AND people.age >= 18"
    );

    let output = run(&[
        "--schema",
        schema_path,
        "--format",
        "bound",
        "--verbose",
        "age between 18 and 65",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["people.age BETWEEN ? AND ?", "18", "65"]);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("resolved field"));
}

#[test]
fn json_output() {
    let output = run(&["--format", "json", "not modela.x != 1"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cond = &value["not"]["condition"];
    assert_eq!(cond["parameter"]["base"], "modela");
    assert_eq!(cond["operator"], "!=");
}

#[test]
fn reports_syntax_errors() {
    let output = run(&["--flavor", "sql", "x >"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to parse expression"));
    assert!(stderr.contains("Parsing syntax error"));
}

#[test]
fn reports_unknown_fields() {
    let output = run(&["--schema", "fixture/models.yaml", "modelc.x > 1"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no model among [modela, modelb, modela2] has field modelc.x"));
}
