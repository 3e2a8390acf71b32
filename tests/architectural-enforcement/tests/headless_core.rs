//! Integration Test: Headless Core
//!
//! The session core runs chat panels it never draws: every user-visible
//! effect leaves the core as a `PanelMessage` on a channel. A UI crate in the
//! core manifest, or a direct terminal write in core source, means
//! presentation leaked into orchestration.
//!
//! **Policy**: `tandem/core` MUST NOT depend on UI or rendering crates, and
//! MUST NOT write to stdout or stderr directly; diagnostics go through
//! `tracing`.

use std::fs;
use std::path::{Path, PathBuf};

/// UI and rendering crates the core must never pull in.
const FORBIDDEN_UI_CRATES: &[&str] = &[
    "ratatui",
    "crossterm",
    "termion",
    "cursive",
    "egui",
    "eframe",
    "iced",
    "gtk",
    "gtk4",
    "druid",
    "dioxus",
    "tauri",
    "slint",
    "winit",
];

/// Test that the core manifest carries no UI or rendering dependencies
#[test]
fn test_core_manifest_carries_no_ui_crates() {
    let manifest_path = workspace_root().join("tandem/core/Cargo.toml");
    let manifest = fs::read_to_string(&manifest_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", manifest_path.display()));

    let mut violations = Vec::new();
    for (idx, line) in manifest.lines().enumerate() {
        for ui_crate in FORBIDDEN_UI_CRATES {
            if names_dependency(line, ui_crate) {
                violations.push(format!(
                    "{}:{} - {}",
                    manifest_path.display(),
                    idx + 1,
                    line.trim()
                ));
            }
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ UI crates found in the core manifest!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\nThe core is headless: rendering belongs to the surfaces that embed it.");

        panic!(
            "\nFound {} UI dependency violation(s) in the core manifest.",
            violations.len()
        );
    }
}

/// Test that core source never writes to the terminal directly
#[test]
fn test_core_source_never_writes_to_the_terminal() {
    let src = workspace_root().join("tandem/core/src");
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(&src)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }

        let content = match fs::read_to_string(entry.path()) {
            Ok(c) => c,
            Err(_) => continue,
        };
        let lines: Vec<&str> = content.lines().collect();

        for (idx, line) in lines.iter().enumerate() {
            // Skip comments
            let code_part = line.split("//").next().unwrap_or(line);

            if !(code_part.contains("println!") || code_part.contains("print!")) {
                continue;
            }
            if is_in_test_function(&lines, idx) {
                continue;
            }

            violations.push(format!(
                "{}:{} - {}",
                entry.path().display(),
                idx + 1,
                line.trim()
            ));
        }
    }

    if !violations.is_empty() {
        eprintln!("\n❌ Direct terminal writes found in core source!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\nUse tracing for diagnostics; panels own the terminal.");

        panic!(
            "\nFound {} terminal write violation(s) in core source.",
            violations.len()
        );
    }
}

/// Resolve the workspace root from this package's manifest directory.
fn workspace_root() -> PathBuf {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    assert!(
        root.join("Cargo.toml").exists(),
        "expected the workspace manifest at {}",
        root.display()
    );
    root
}

/// Whether a manifest line declares a dependency on `krate`.
///
/// Matches `krate = ...` at the start of the line, ignoring TOML comments.
/// Prefix collisions (`tracing` vs `tracing-subscriber`) do not count.
fn names_dependency(line: &str, krate: &str) -> bool {
    let code = line.split('#').next().unwrap_or(line).trim();
    code.strip_prefix(krate)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    let mut fn_idx = None;
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("fn ") || line.contains(" fn ") {
            fn_idx = Some(i);
            break;
        }

        if line.starts_with("mod ") {
            return false;
        }
    }

    let Some(fn_idx) = fn_idx else {
        return false;
    };

    for i in (0..fn_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("#[test]")
            || line.starts_with("#[tokio::test")
            || line.starts_with("#[cfg(test)]")
        {
            return true;
        }

        if line.starts_with("fn ") || line.starts_with("mod ") || line.starts_with("impl ") {
            break;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_matching() {
        assert!(names_dependency("ratatui = \"0.29\"", "ratatui"));
        assert!(names_dependency(
            "crossterm = { version = \"0.28\" }",
            "crossterm"
        ));
        assert!(
            !names_dependency("# ratatui = \"0.29\"", "ratatui"),
            "commented-out dependencies do not count"
        );
        assert!(
            !names_dependency("tracing-subscriber = \"0.3\"", "tracing"),
            "prefix collisions do not count"
        );
    }

    #[test]
    fn test_terminal_write_exemption_in_tests() {
        let test_code = vec![
            "#[test]",
            "fn test_debug_dump() {",
            "    println!(\"{transcript:?}\");",
            "}",
        ];

        assert!(is_in_test_function(&test_code, 2));
    }
}
