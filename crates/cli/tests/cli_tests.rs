use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const SYMBOLS: &str = r#"[
    {"name": "GetLife", "kind": "function",
     "links": [{"url": "../struct_s_c2_a_p_i_1_1_unit.html#a10e2", "scope": "SC2API::Unit"}]},
    {"name": "GetEnergy", "kind": "function",
     "links": [{"url": "../struct_s_c2_a_p_i_1_1_unit.html#a4d1f", "scope": "SC2API::Unit"}]},
    {"name": "Unit", "kind": "struct",
     "links": [{"url": "../struct_s_c2_a_p_i_1_1_unit.html", "scope": "SC2API"}]}
]"#;

fn doxsearch() -> Command {
    let mut cmd = Command::cargo_bin("doxsearch").unwrap();
    cmd.env_remove("DOXSEARCH_MATCH_MODE")
        .env_remove("DOXSEARCH_LOOKUP_LIMIT")
        .env_remove("DOXSEARCH_VAR_NAME")
        .env_remove("DOXSEARCH_SHARD_GLOB");
    cmd
}

fn build_into(dir: &Path) {
    let input = dir.join("symbols.json");
    fs::write(&input, SYMBOLS).unwrap();
    doxsearch()
        .arg("build")
        .arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(dir.join("search"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
}

#[test]
fn test_cli_help() {
    doxsearch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Static symbol index"));
}

#[test]
fn test_cli_lookup_help() {
    doxsearch().arg("lookup").arg("--help").assert().success().stdout(predicate::str::contains("section"));
}

#[test]
fn test_build_writes_shards_and_manifest() {
    let temp = tempfile::TempDir::new().unwrap();
    build_into(temp.path());

    let search = temp.path().join("search");
    let manifest = fs::read_to_string(search.join("searchdata.js")).unwrap();
    assert!(manifest.contains("var indexSectionNames ="));
    assert!(manifest.contains("\"functions\""));
    let shard = fs::read_to_string(search.join("functions_0.js")).unwrap();
    assert!(shard.starts_with("var searchData=\n[\n"));
    assert!(shard.contains("['getlife',['GetLife',['../struct_s_c2_a_p_i_1_1_unit.html#a10e2',1,'SC2API::Unit']]]"));
}

#[test]
fn test_lookup_after_build() {
    let temp = tempfile::TempDir::new().unwrap();
    build_into(temp.path());

    doxsearch()
        .arg("lookup")
        .arg("get")
        .arg("--dir")
        .arg(temp.path().join("search"))
        .assert()
        .success()
        .stdout(predicate::str::contains("GetEnergy").and(predicate::str::contains("GetLife")))
        .stdout(predicate::str::contains("\"Unit\"").not());

    doxsearch()
        .arg("lookup")
        .arg("nit")
        .arg("--dir")
        .arg(temp.path().join("search"))
        .arg("--section")
        .arg("classes")
        .arg("--mode")
        .arg("substring")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"display_name\": \"Unit\""));
}

#[test]
fn test_build_rejects_bad_var_name() {
    let temp = tempfile::TempDir::new().unwrap();
    let input = temp.path().join("symbols.json");
    fs::write(&input, SYMBOLS).unwrap();
    doxsearch()
        .arg("build")
        .arg("--input")
        .arg(&input)
        .arg("--var")
        .arg("not valid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JavaScript identifier"));
}

#[test]
fn test_check_reports_malformed_file() {
    let temp = tempfile::TempDir::new().unwrap();
    let good = temp.path().join("all_0.js");
    let bad = temp.path().join("all_1.js");
    fs::write(&good, "var searchData=\n[\n  ['attack',['Attack',['u.html#1',1,'SC2API::Unit']]]\n];\n").unwrap();
    fs::write(&bad, "var searchData=\n[\n  ['getlife',\n").unwrap();

    doxsearch()
        .arg("check")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ok    ").and(predicate::str::contains("error ")));

    doxsearch().arg("check").arg(&good).assert().success();
}

#[test]
fn test_check_survives_deep_nesting() {
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("all_0.js");
    fs::write(&nested, format!("var searchData={}", "[".repeat(200_000))).unwrap();

    doxsearch()
        .arg("check")
        .arg(&nested)
        .assert()
        .failure()
        .stdout(predicate::str::contains("nesting too deep"));
}

#[test]
fn test_dump_prints_rows() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp.path().join("all_0.js");
    fs::write(&file, "var searchData=\n[\n  ['attack',['Attack',['u.html#1',1,'SC2API::Unit']]]\n];\n").unwrap();

    doxsearch()
        .arg("dump")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"key\": \"attack\""))
        .stdout(predicate::str::contains("\"scope_label\": \"SC2API::Unit\""));

    doxsearch().arg("dump").arg(&file).arg("--var").arg("other").assert().failure();
}
