use std::fs;
use std::path::PathBuf;

use gridpage::{compile, CompileOptions, LayoutRequest};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

#[test]
fn golden_page_matches_fixture() {
    let payload = fs::read_to_string("tests/goldens/layouts/dashboard.json").expect("read fixture");
    let request = LayoutRequest::from_json(&payload).expect("parse fixture");
    let doc = compile(&request, &CompileOptions::default()).expect("compile fixture");

    let expected_path = golden_path("dashboard.html");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, &doc.html).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to create it. Skipping.",
            expected_path
        );
        return;
    }

    let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(doc.html, expected);
}
