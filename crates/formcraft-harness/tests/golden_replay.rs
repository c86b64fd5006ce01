//! Golden-output tests for scripted editing sessions.
//!
//! Each scenario replays `tests/golden/{name}.script.json` (optionally on top
//! of `{name}.document.json`) and compares the rendered markup with
//! `{name}.html`. Run with `BLESS=1` to rewrite the expected files.

use std::path::Path;

use formcraft_core::NodeId;
use formcraft_harness::{
    ReplayOptions, ReplayReport, Script, check_golden, golden_path, is_bless_mode,
    load_document, replay,
};
use formcraft_runtime::EditorConfig;

fn id(raw: u64) -> NodeId {
    NodeId::new(raw).expect("test ID must be non-zero")
}

fn base_dir() -> &'static Path {
    Path::new(env!("CARGO_MANIFEST_DIR"))
}

fn run_scenario(name: &str) -> ReplayReport {
    let script = Script::load(&golden_path(base_dir(), name, "script.json")).expect("script");
    let document = golden_path(base_dir(), name, "document.json");
    let initial = document
        .exists()
        .then(|| load_document(&document).expect("document"));
    let options = ReplayOptions {
        config: EditorConfig::default(),
        initial,
        compact: false,
    };
    let report = replay(&script, &options).expect("replay");

    let result = check_golden(
        name,
        &golden_path(base_dir(), name, "html"),
        &report.markup,
        is_bless_mode(),
    )
    .expect("golden io");
    assert!(result.is_pass(), "{}\n{}", result.format(), report.markup);
    report
}

#[test]
fn signup_form() {
    let report = run_scenario("signup");
    assert_eq!(report.committed_nodes(), vec![id(1)]);
    // The last add selected the button.
    assert_eq!(report.selected, Some(id(3)));
    assert_eq!(report.rejected_drops(), 0);
}

#[test]
fn nested_move_and_cancel() {
    let report = run_scenario("nested_move");
    assert_eq!(report.committed_nodes(), vec![id(3), id(2)]);
    let root_ids: Vec<NodeId> = report.snapshot.nodes.iter().map(|n| n.id).collect();
    assert_eq!(root_ids, vec![id(1)]);
}
