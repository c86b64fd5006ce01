//! Golden-output files for replay scenarios.
//!
//! Each scenario keeps its expected markup next to its script under
//! `tests/golden/`. Set `BLESS=1` to rewrite the expected files from the
//! current output instead of comparing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x100000001b3;

const CHECKSUM_PREFIX: &str = "fnv1a64:";

/// Stable checksum of `text`, identical across platforms and runs.
#[must_use]
pub fn text_checksum(text: &str) -> String {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in text.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{CHECKSUM_PREFIX}{hash:016x}")
}

/// `{base_dir}/tests/golden/{scenario}.{extension}`.
#[must_use]
pub fn golden_path(base_dir: &Path, scenario: &str, extension: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("golden")
        .join(format!("{scenario}.{extension}"))
}

/// Whether expected files should be rewritten (BLESS mode).
#[must_use]
pub fn is_bless_mode() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Expected output, or `None` when the file does not exist yet. A single
/// trailing newline is ignored.
pub fn load_golden(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(
            content
                .strip_suffix('\n')
                .map_or_else(|| content.clone(), str::to_string),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn save_golden(path: &Path, actual: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{actual}\n"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenOutcome {
    Pass,
    Fail,
    /// No expected file exists yet.
    Missing,
    /// The expected file was rewritten.
    Blessed,
}

/// Result of comparing one scenario's output with its golden file.
#[derive(Debug, Clone)]
pub struct GoldenResult {
    pub scenario: String,
    pub outcome: GoldenOutcome,
    pub expected_checksum: Option<String>,
    pub actual_checksum: String,
    /// Byte offset of the first difference.
    pub first_difference: Option<usize>,
}

impl GoldenResult {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self.outcome, GoldenOutcome::Pass | GoldenOutcome::Blessed)
    }

    /// Human-readable one-line summary.
    #[must_use]
    pub fn format(&self) -> String {
        match self.outcome {
            GoldenOutcome::Pass => format!("PASS: {} ({})", self.scenario, self.actual_checksum),
            GoldenOutcome::Blessed => {
                format!("BLESSED: {} ({})", self.scenario, self.actual_checksum)
            }
            GoldenOutcome::Missing => format!(
                "MISSING: {} has no golden file; rerun with BLESS=1",
                self.scenario
            ),
            GoldenOutcome::Fail => format!(
                "FAIL: {} differs at byte {}\n  expected: {}\n  actual:   {}",
                self.scenario,
                self.first_difference.unwrap_or(0),
                self.expected_checksum.as_deref().unwrap_or("<none>"),
                self.actual_checksum,
            ),
        }
    }
}

/// Compare `actual` with the golden file at `path`, or rewrite it when
/// `bless` is set.
pub fn check_golden(
    scenario: &str,
    path: &Path,
    actual: &str,
    bless: bool,
) -> io::Result<GoldenResult> {
    let actual_checksum = text_checksum(actual);
    if bless {
        save_golden(path, actual)?;
        return Ok(GoldenResult {
            scenario: scenario.to_string(),
            outcome: GoldenOutcome::Blessed,
            expected_checksum: Some(actual_checksum.clone()),
            actual_checksum,
            first_difference: None,
        });
    }

    let Some(expected) = load_golden(path)? else {
        return Ok(GoldenResult {
            scenario: scenario.to_string(),
            outcome: GoldenOutcome::Missing,
            expected_checksum: None,
            actual_checksum,
            first_difference: None,
        });
    };
    let first_difference = first_difference(&expected, actual);
    Ok(GoldenResult {
        scenario: scenario.to_string(),
        outcome: if first_difference.is_none() {
            GoldenOutcome::Pass
        } else {
            GoldenOutcome::Fail
        },
        expected_checksum: Some(text_checksum(&expected)),
        actual_checksum,
        first_difference,
    })
}

fn first_difference(expected: &str, actual: &str) -> Option<usize> {
    let common = expected
        .bytes()
        .zip(actual.bytes())
        .position(|(a, b)| a != b);
    match common {
        Some(at) => Some(at),
        None if expected.len() == actual.len() => None,
        None => Some(expected.len().min(actual.len())),
    }
}
