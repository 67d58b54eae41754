use super::Pacscript;
use crate::msg;

use anyhow::{Context, Result};
use console::style;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

/// The patched line vector plus enough bookkeeping to print a diff.
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub lines: Vec<String>,
    /// (line index, old line, new line) for every line that changed.
    pub changed: Vec<(usize, String, String)>,
}

lazy_static! {
    // prefix / quoted-or-bare value / remainder (closing quote, comments)
    static ref VALUE: Regex =
        Regex::new(r#"^(\s*[A-Za-z_][A-Za-z0-9_]*=["']?)([^"'\s]*)(.*)$"#).unwrap();
}

/// Rewrite the version-bearing fields of a pacscript. Every other line is
/// carried over untouched, so a diff against the original shows changes in
/// the version, url and hash lines only.
pub fn patch(ps: &Pacscript, latest: &str, new_hash: Option<&str>) -> PatchResult {
    let mut lines = ps.lines.clone();
    let mut changed = Vec::new();

    let mut replace = |lines: &mut Vec<String>, no: usize, new_line: String| {
        if lines[no] != new_line {
            changed.push((no, lines[no].clone(), new_line.clone()));
            lines[no] = new_line;
        }
    };

    // version= keeps its indentation and any trailing comment
    let new_version_line = set_value(&ps.lines[ps.version.line_no], latest);
    replace(&mut lines, ps.version.line_no, new_version_line);

    // Every exact occurrence of the old version inside the url template.
    // With a ${version} template there is nothing to do here, which is fine.
    let url_no = ps.url.line_no;
    let new_url_line = ps.lines[url_no].replace(&ps.version.value, latest);
    replace(&mut lines, url_no, new_url_line);

    if let (Some(hash), Some(digest)) = (&ps.hash, new_hash) {
        let new_hash_line = set_value(&ps.lines[hash.line_no], digest);
        replace(&mut lines, hash.line_no, new_hash_line);
    }

    PatchResult { lines, changed }
}

fn set_value(line: &str, value: &str) -> String {
    match VALUE.captures(line) {
        Some(caps) => format!("{}{}{}", &caps[1], value, &caps[3]),
        None => line.to_string(),
    }
}

/// Atomic in-place rewrite: write a sibling temp file, then rename over the
/// original so a crash never leaves a half-patched pacscript behind.
pub async fn write_atomic(path: &Path, lines: &[String], trailing_newline: bool) -> Result<()> {
    let mut text = lines.join("\n");
    if trailing_newline {
        text.push('\n');
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".pacup-new");
    let tmp = Path::new(&tmp);
    tokio::fs::write(tmp, &text)
        .await
        .context(format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(tmp, path)
        .await
        .context(format!("Failed to replace {}", path.display()))?;
    Ok(())
}

pub fn show_diff(result: &PatchResult, name: &str) {
    msg!("=>", "Changes to {}:", style(name).bold());
    for (no, old, new) in &result.changed {
        msg!("", "{}", style(format!("-{:>4} {}", no + 1, old)).red());
        msg!("", "{}", style(format!("+{:>4} {}", no + 1, new)).green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SAMPLE: &str = r#"# a header comment
pkgname="hugo"
version="0.101.0" # keep me
url="https://example.com/hugo-0.101.0/hugo_0.101.0.deb"
hash="2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
repology=("project: hugo")

package() {
    true
}
"#;

    fn sample() -> Pacscript {
        Pacscript::parse(Path::new("hugo.pacscript"), SAMPLE).unwrap()
    }

    #[test]
    fn patches_only_version_bearing_lines() {
        let ps = sample();
        let digest = "a".repeat(64);
        let result = patch(&ps, "0.102.1", Some(&digest));

        assert_eq!(result.lines[2], "version=\"0.102.1\" # keep me");
        assert_eq!(
            result.lines[3],
            "url=\"https://example.com/hugo-0.102.1/hugo_0.102.1.deb\""
        );
        assert_eq!(result.lines[4], format!("hash=\"{}\"", digest));

        // Everything else is byte-identical
        for (no, line) in result.lines.iter().enumerate() {
            if ![2, 3, 4].contains(&no) {
                assert_eq!(line, &ps.lines[no]);
            }
        }
        assert_eq!(result.changed.len(), 3);
    }

    #[test]
    fn version_absent_from_url_is_a_no_op_for_url() {
        let src = "version=\"1.0\"\nurl=\"https://example.com/v1/pkg.tar.gz\"\n";
        let ps = Pacscript::parse(Path::new("pkg.pacscript"), src).unwrap();
        let result = patch(&ps, "2.0", None);

        assert_eq!(result.lines[0], "version=\"2.0\"");
        assert_eq!(result.lines[1], ps.lines[1]);
        assert_eq!(result.changed.len(), 1);
    }

    #[test]
    fn same_version_changes_nothing() {
        let ps = sample();
        let result = patch(
            &ps,
            "0.101.0",
            Some("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"),
        );
        assert!(result.changed.is_empty());
        assert_eq!(result.lines, ps.lines);
    }

    #[test]
    fn set_value_preserves_surroundings() {
        assert_eq!(
            set_value("  version=\"1.0\" # note", "2.0"),
            "  version=\"2.0\" # note"
        );
        assert_eq!(set_value("version='1.0'", "2.0"), "version='2.0'");
        assert_eq!(set_value("version=1.0", "2.0"), "version=2.0");
    }
}
