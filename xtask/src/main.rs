//! `cargo run -p xtask` checks `docs/compliance_matrix.csv`
//!
//! Each row ties one operation to the tests that exercise it:
//!
//! ```text
//! requirement_id,crate,operation,description,test_refs
//! PTR-01,dor-pointer,encode_segment,escape ~ then /,dor-pointer/src/segment.rs::encode_escapes_tilde_before_slash
//! ```
//!
//! `test_refs` is a `;`-separated list of `path::test_fn`. The file must
//! exist and define `fn test_fn`; the crate column must name a workspace
//! directory.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const COLUMNS: usize = 5;

fn main() {
    match run() {
        Ok(rows) => println!("Compliance matrix OK ({rows} requirements)"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Row<'a> {
    line: usize,
    requirement: &'a str,
    krate: &'a str,
    refs: Vec<TestRef<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
struct TestRef<'a> {
    path: &'a str,
    function: Option<&'a str>,
}

fn run() -> Result<usize, String> {
    let repo = repo_root()?;
    let matrix_path = repo.join("docs/compliance_matrix.csv");
    let content = fs::read_to_string(&matrix_path)
        .map_err(|e| format!("reading {} failed: {e}", matrix_path.display()))?;

    let mut problems: Vec<String> = Vec::new();
    let mut rows = 0;
    for (idx, line) in content.lines().enumerate().skip(1) {
        let row = match parse_row(idx + 1, line)? {
            Some(row) => row,
            None => continue,
        };
        rows += 1;
        problems.extend(check_row(&repo, &row));
    }

    if problems.is_empty() {
        return Ok(rows);
    }
    let mut message = String::from("Compliance matrix validation failed:\n");
    for problem in &problems {
        message.push_str("  - ");
        message.push_str(problem);
        message.push('\n');
    }
    Err(message)
}

fn parse_row(line_no: usize, line: &str) -> Result<Option<Row<'_>>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let columns: Vec<&str> = line.splitn(COLUMNS, ',').map(str::trim).collect();
    if columns.len() < COLUMNS {
        return Err(format!(
            "line {line_no}: expected {COLUMNS} columns, found {}",
            columns.len()
        ));
    }
    if columns[0].is_empty() {
        return Err(format!("line {line_no}: requirement_id empty"));
    }

    let refs = columns[4]
        .split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|reference| match reference.split_once("::") {
            Some((path, function)) => TestRef {
                path: path.trim(),
                function: Some(function.trim()),
            },
            None => TestRef {
                path: reference,
                function: None,
            },
        })
        .collect();

    Ok(Some(Row {
        line: line_no,
        requirement: columns[0],
        krate: columns[1],
        refs,
    }))
}

fn check_row(repo: &Path, row: &Row<'_>) -> Vec<String> {
    let label = format!("{} (line {})", row.requirement, row.line);
    let mut problems = Vec::new();

    if !repo.join(row.krate).is_dir() {
        problems.push(format!("{label}: crate directory '{}' not found", row.krate));
    }
    if row.refs.is_empty() {
        problems.push(format!("{label}: no test_refs"));
    }
    for test_ref in &row.refs {
        let path = repo.join(test_ref.path);
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(_) => {
                problems.push(format!("{label}: {} not found", path.display()));
                continue;
            }
        };
        if let Some(function) = test_ref.function {
            if !defines_fn(&source, function) {
                problems.push(format!("{label}: fn {function} not found in {}", test_ref.path));
            }
        }
    }
    problems
}

fn defines_fn(source: &str, name: &str) -> bool {
    let needle = format!("fn {name}");
    source.match_indices(&needle).any(|(idx, _)| {
        source[idx + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '(' || c == '<' || c.is_whitespace())
    })
}

fn repo_root() -> Result<PathBuf, String> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| "xtask manifest directory has no parent".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_test_refs() {
        let row = parse_row(2, "R-2,dor-pointer,get,lookup,a.rs::t1; b.rs")
            .unwrap()
            .unwrap();
        assert_eq!(row.requirement, "R-2");
        assert_eq!(row.krate, "dor-pointer");
        assert_eq!(
            row.refs,
            vec![
                TestRef { path: "a.rs", function: Some("t1") },
                TestRef { path: "b.rs", function: None },
            ]
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_row(1, "   ").unwrap(), None);
        assert_eq!(parse_row(1, "# note").unwrap(), None);
        assert!(parse_row(1, "R-3,dor-cli").is_err());
    }

    #[test]
    fn fn_lookup_requires_exact_name() {
        let source = "fn alpha() {}\nfn alpha_two() {}\nasync fn gamma<T>() {}";
        assert!(defines_fn(source, "alpha"));
        assert!(defines_fn(source, "alpha_two"));
        assert!(defines_fn(source, "gamma"));
        assert!(!defines_fn(source, "alph"));
        assert!(!defines_fn(source, "beta"));
    }
}
