//! Integration Test: Blocking I/O Prohibition
//!
//! The session core lives on a tokio runtime; one blocked worker thread
//! stalls every session it is driving. File reads during synchronous startup
//! are fine, anything on an async path goes through async APIs.
//!
//! **Policy**: async production code under `tandem/core/src` MUST NOT use
//! blocking I/O. Bridge traffic goes through reqwest's async client; raw
//! sockets and `reqwest::blocking` are forbidden everywhere.
//! **Exceptions**: synchronous functions that run before the runtime starts
//! (config loading), test code, and the backend test support module.

use std::fs;
use std::path::{Path, PathBuf};

/// Test that production code does not use blocking I/O on async paths
#[test]
fn test_no_blocking_io_in_production_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking I/O found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - std::fs::* inside async functions");
        eprintln!("  - std::net::* anywhere (reqwest owns the bridge connection)");
        eprintln!("  - reqwest::blocking::* anywhere");
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - std::fs in synchronous startup code (config loading)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all blocking I/O calls in the core's production code
fn find_blocking_io_violations() -> Vec<String> {
    let mut violations = Vec::new();

    let src = core_src();
    for entry in walkdir::WalkDir::new(&src)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            check_file(entry.path(), &mut violations);
        }
    }

    violations
}

/// Resolve `tandem/core/src` from the workspace root, so the scan works no
/// matter which directory cargo runs the test from.
fn core_src() -> PathBuf {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tandem/core/src");
    assert!(
        src.exists(),
        "expected the core source tree at {}; was it moved without updating this test?",
        src.display()
    );
    src
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    if path.file_name().and_then(|n| n.to_str()) == Some("test_utils.rs") {
        return;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let line_number = idx + 1;

        // Skip comments
        let code_part = line.split("//").next().unwrap_or(line);

        if is_in_test_function(&lines, idx) {
            continue;
        }

        // Raw sockets never belong in the core; the bridge client owns HTTP.
        if code_part.contains("std::net::") {
            violations.push(format!(
                "{}:{} - Raw socket I/O: {}",
                path.display(),
                line_number,
                line.trim()
            ));
        }

        if code_part.contains("reqwest::blocking") {
            violations.push(format!(
                "{}:{} - Blocking HTTP client: {}",
                path.display(),
                line_number,
                line.trim()
            ));
        }

        // Blocking file reads are a startup-only affordance.
        if code_part.contains("std::fs::") && is_in_async_function(&lines, idx) {
            violations.push(format!(
                "{}:{} - Blocking file I/O on an async path: {}",
                path.display(),
                line_number,
                line.trim()
            ));
        }
    }
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    // Find the enclosing function first
    let mut fn_idx = None;
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if is_fn_line(line) {
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

    // Then scan the attribute lines above it for test markers
    for i in (0..fn_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("#[test]")
            || line.starts_with("#[tokio::test")
            || line.starts_with("#[cfg(test)]")
        {
            return true;
        }

        if is_fn_line(line) || line.starts_with("mod ") || line.starts_with("impl ") {
            break;
        }
    }

    false
}

/// Check if line is inside an async function
fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.contains("async fn ") {
            return true;
        }

        // A synchronous function boundary ends the search.
        if is_fn_line(line) && !line.contains("async") {
            return false;
        }

        if line.starts_with("mod ") || (line.starts_with("impl ") && line.contains('{')) {
            return false;
        }
    }
    false
}

/// A function definition line, with or without visibility qualifiers.
fn is_fn_line(line: &str) -> bool {
    line.starts_with("fn ")
        || line.starts_with("pub fn ")
        || line.starts_with("pub(crate) fn ")
        || line.starts_with("async fn ")
        || line.starts_with("pub async fn ")
        || line.starts_with("pub(crate) async fn ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_blocking_read_in_async_function() {
        let test_code = vec![
            "pub async fn refresh(&self) {",
            "    let contents = std::fs::read_to_string(\"state.json\")?;",
            "}",
        ];

        assert!(
            is_in_async_function(&test_code, 1),
            "blocking reads inside async functions must be flagged"
        );
    }

    #[test]
    fn test_exempts_synchronous_startup_code() {
        let test_code = vec![
            "pub fn load_config_from_path(path: Option<PathBuf>) -> Result<SessionConfig, ConfigError> {",
            "    let contents = std::fs::read_to_string(config_path)?;",
            "}",
        ];

        assert!(
            !is_in_async_function(&test_code, 1),
            "synchronous startup code may read files directly"
        );
    }

    #[test]
    fn test_exempts_test_functions() {
        let test_code = vec![
            "#[test]",
            "fn test_writes_a_fixture() {",
            "    std::fs::write(\"fixture.toml\", \"[bridge]\").unwrap();",
            "}",
        ];

        assert!(
            is_in_test_function(&test_code, 2),
            "test code may use blocking I/O"
        );
    }
}
