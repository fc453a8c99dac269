use std::fs;
use std::path::PathBuf;

use savant::{render_bed, RichIntervalRecord};

/// Golden BED12 file for `name` under `tests/snapshots/records`.
fn golden_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots", "records"]
        .iter()
        .collect::<PathBuf>()
        .join(format!("{name}.bed"))
}

/// Render `records` as BED12 and compare them with the golden file line by
/// line. `SAVANT_UPDATE_SNAPSHOTS=1` rewrites the golden file instead.
pub fn assert_bed_matches(name: &str, records: &[RichIntervalRecord]) {
    let rendered = render_bed(records);
    let path = golden_path(name);
    if std::env::var_os("SAVANT_UPDATE_SNAPSHOTS").is_some() {
        fs::write(&path, &rendered).expect("write golden BED");
        return;
    }

    let golden = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()));
    let want: Vec<&str> = golden.lines().map(str::trim_end).collect();
    let got: Vec<&str> = rendered.lines().map(str::trim_end).collect();

    if let Some(row) = want.iter().zip(&got).position(|(w, g)| w != g) {
        panic!(
            "{} differs at line {}\n  golden:   {}\n  rendered: {}",
            path.display(),
            row + 1,
            want[row],
            got[row]
        );
    }
    assert_eq!(
        want.len(),
        got.len(),
        "{} has {} records, rendered {}",
        path.display(),
        want.len(),
        got.len()
    );
}
