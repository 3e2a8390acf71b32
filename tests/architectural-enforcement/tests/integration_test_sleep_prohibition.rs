//! Integration Test: Sleep Prohibition
//!
//! The session core is event-driven: it waits on channels and sockets, never
//! on the clock. A sleep in production code papers over a missing signal and
//! shows up later as latency nobody can attribute.
//!
//! **Policy**: production code under `tandem/core/src` MUST NOT call sleep.
//! **Exceptions**: test code, and the scripted latency knob in the backend
//! test support module (`test_utils.rs`), which exists so tests can hold a
//! call in flight.

use std::fs;
use std::path::{Path, PathBuf};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - Test code (#[test] or #[tokio::test] functions)");
        eprintln!("  - Scripted latency in backend test support (test_utils.rs)");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops (wait on the channel instead)");
        eprintln!("  - Sleep as poor man's synchronization");
        eprintln!("  - Sleep to pace the assistant bridge");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls in the core's production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    check_directory(
        &core_src(),
        &mut violations,
        &SleepPolicy {
            allow_tests: true,
            allow_test_support: true,
        },
    );

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

struct SleepPolicy {
    allow_tests: bool,
    allow_test_support: bool,
}

fn check_directory(dir: &Path, violations: &mut Vec<String>, policy: &SleepPolicy) {
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            check_file(entry.path(), violations, policy);
        }
    }
}

fn check_file(path: &Path, violations: &mut Vec<String>, policy: &SleepPolicy) {
    if policy.allow_test_support && is_test_support_file(path) {
        return;
    }

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };

    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        // Skip comments
        let code_part = line.split("//").next().unwrap_or(line);

        if code_part.contains("::sleep(") || code_part.contains(".sleep(") {
            if policy.allow_tests && is_in_test_function(&lines, idx) {
                continue;
            }

            violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
        }
    }
}

/// Test support modules may sleep; the mock bridge's latency knob exists so
/// tests can observe a call while it is still in flight.
fn is_test_support_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("test_utils.rs")
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    // Find the enclosing function first
    let mut fn_idx = None;
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("fn ") || line.contains(" fn ") {
            fn_idx = Some(i);
            break;
        }

        // Stop at module boundaries
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
    fn test_detects_sleep_outside_tests() {
        let test_code = vec![
            "async fn poll_for_reply() {",
            "    tokio::time::sleep(Duration::from_millis(10)).await;",
            "}",
        ];

        assert!(
            !is_in_test_function(&test_code, 1),
            "a plain function is not a test exemption"
        );
    }

    #[test]
    fn test_exempts_test_functions() {
        let test_code = vec![
            "#[tokio::test]",
            "async fn test_slow_bridge() {",
            "    tokio::time::sleep(Duration::from_millis(10)).await;",
            "}",
        ];

        assert!(
            is_in_test_function(&test_code, 2),
            "test attributes should exempt the function body"
        );
    }

    #[test]
    fn test_exempts_test_support_files() {
        assert!(is_test_support_file(Path::new(
            "tandem/core/src/backend/test_utils.rs"
        )));
        assert!(!is_test_support_file(Path::new(
            "tandem/core/src/controller.rs"
        )));
    }
}
