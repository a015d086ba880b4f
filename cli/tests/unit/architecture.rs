//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold:
//! domain is pure, application talks to the outside only through ports.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    /// Process a line and return `true` if it's inside a `#[cfg(test)]` block.
    fn process_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.contains("#[cfg(test)]") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

fn src_dir(parts: &[&str]) -> PathBuf {
    let mut dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    for part in parts {
        dir = dir.join(part);
    }
    dir
}

fn relative(file: &Path) -> String {
    file.strip_prefix(env!("CARGO_MANIFEST_DIR"))
        .unwrap_or(file)
        .display()
        .to_string()
}

/// Non-test lines under `dir` containing any of `needles`.
fn forbidden_lines(dir: &Path, needles: &[&str]) -> Vec<String> {
    let mut violations = Vec::new();
    for file in collect_rs_files(dir) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let mut tracker = CfgTestTracker::new();
        for (i, line) in content.lines().enumerate() {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            if in_test || trimmed.starts_with("//") {
                continue;
            }
            if let Some(needle) = needles.iter().find(|n| line.contains(*n)) {
                violations.push(format!("{}:{}: `{needle}`: {line}", relative(&file), i + 1));
            }
        }
    }
    violations
}

#[test]
fn domain_is_free_of_io_and_outer_layers() {
    let violations = forbidden_lines(
        &src_dir(&["domain"]),
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio::",
            "std::fs",
            "std::process",
            "std::net",
            "russh",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_depends_only_on_domain() {
    let violations = forbidden_lines(
        &src_dir(&["application"]),
        &["crate::infra", "crate::commands", "crate::output", "russh", "std::fs"],
    );
    assert!(
        violations.is_empty(),
        "application/ must reach the outside only through ports:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir(&["infra"])) {
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if line.contains("crate::commands") || line.contains("crate::output") {
                violations.push(format!(
                    "{}:{}: forbidden import in infra/: {line}",
                    relative(&file),
                    i + 1
                ));
            }
        }
    }
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations = forbidden_lines(&src_dir(&["infra"]), &["println!", "eprintln!"]);
    assert!(
        violations.is_empty(),
        "infra/ must not use println!/eprintln! outside #[cfg(test)]:\n{}",
        violations.join("\n")
    );
}

#[test]
fn services_do_not_print() {
    let violations = forbidden_lines(
        &src_dir(&["application", "services"]),
        &["println!", "eprintln!", "print!("],
    );
    assert!(
        violations.is_empty(),
        "services report through ProgressReporter, not stdout:\n{}",
        violations.join("\n")
    );
}

#[test]
fn remote_commands_are_built_in_one_place() {
    // Command literals belong in domain/shell.rs; services call its builders.
    let violations = forbidden_lines(
        &src_dir(&["application", "services"]),
        &["\"apt-get", "\"yum ", "\"dnf ", "\"git clone", "\"certbot --", "\"nginx -t"],
    );
    assert!(
        violations.is_empty(),
        "remote command text outside domain/shell.rs:\n{}",
        violations.join("\n")
    );
}

/// All confirmation prompts in `commands/` must go through `app.confirm()`.
#[test]
fn commands_use_standardized_confirmation() {
    let violations = forbidden_lines(
        &src_dir(&["commands"]),
        &["io::stdin().lock()", "Confirm::new()", "Password::new()"],
    );
    assert!(
        violations.is_empty(),
        "prompts must go through AppContext:\n{}",
        violations.join("\n")
    );
}

/// Each file in `commands/` must be at most 125 lines of non-test code.
#[test]
fn command_handlers_are_reasonably_sized() {
    let mut violations = Vec::new();
    for file in collect_rs_files(&src_dir(&["commands"])) {
        let Ok(content) = std::fs::read_to_string(&file) else {
            continue;
        };
        let mut tracker = CfgTestTracker::new();
        let count = content
            .lines()
            .filter(|line| {
                let in_test = tracker.process_line(line);
                let trimmed = line.trim();
                !in_test && !trimmed.is_empty() && !trimmed.starts_with("//")
            })
            .count();
        if count > 125 {
            violations.push(format!("{}: {count} non-test lines (limit: 125)", relative(&file)));
        }
    }
    assert!(
        violations.is_empty(),
        "Command handler files exceed 125-line limit; extract logic to application services:\n{}",
        violations.join("\n")
    );
}
