pub mod patch;

use crate::types::ChecksumKind;

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::take_till,
    character::complete::char,
    error::{Error, ErrorKind},
    sequence::delimited,
    IResult, InputTakeAtPosition,
};
use regex::{Captures, Regex};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// A variable assignment tracked back to its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub line_no: usize,
    pub value: String,
}

/// A pacscript with the fields pacup cares about extracted, plus the raw
/// lines so patching can leave everything else byte-identical.
#[derive(Debug, Clone)]
pub struct Pacscript {
    pub path: PathBuf,
    pub pkgname: String,
    pub maintainer: String,
    pub version: Field,
    pub url: Field,
    /// `url` with `${pkgname}`/`${version}` resolved. Falls back to the raw
    /// template when an unknown variable is referenced; see `expand_warning`.
    pub expanded_url: String,
    pub expand_warning: Option<String>,
    pub hash: Option<Field>,
    pub hash_kind: ChecksumKind,
    /// Raw `repology=()` array elements, in declaration order.
    pub repology: Vec<String>,
    pub lines: Vec<String>,
    pub trailing_newline: bool,
}

impl Pacscript {
    pub async fn load(path: &Path) -> Result<Self> {
        let data = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read {}", path.display()))?;
        Self::parse(path, &data)
    }

    pub fn parse(path: &Path, data: &str) -> Result<Self> {
        let lines: Vec<String> = data.lines().map(ToOwned::to_owned).collect();

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let mut pkgname = default_pkgname(stem);
        let mut maintainer = String::new();
        let mut version: Option<Field> = None;
        let mut url: Option<Field> = None;
        let mut hash: Option<Field> = None;
        let mut repology = Vec::new();

        let mut no = 0;
        while no < lines.len() {
            let line = lines[no].trim();

            if let Some(rest) = line.strip_prefix("repology=(") {
                let (elements, consumed) = parse_array(&lines, no, rest)
                    .context(format!("Malformed repology array at line {}", no + 1))?;
                repology = elements;
                no = consumed + 1;
                continue;
            }

            if let Ok((_, (name, value))) = assignment(line) {
                let field = Field {
                    line_no: no,
                    value: value.to_string(),
                };
                match name {
                    "pkgname" => pkgname = field.value,
                    "maintainer" => maintainer = field.value,
                    "version" => version = Some(field),
                    "url" => url = Some(field),
                    "hash" => hash = Some(field),
                    _ => (),
                }
            }
            no += 1;
        }

        let version = match version {
            Some(f) if !f.value.is_empty() => f,
            _ => bail!("{} doesn't declare a version", path.display()),
        };
        let url = match url {
            Some(f) if !f.value.is_empty() => f,
            _ => bail!("{} doesn't declare a url", path.display()),
        };

        let mut vars = HashMap::new();
        vars.insert("pkgname", pkgname.as_str());
        vars.insert("version", version.value.as_str());
        let (expanded_url, expand_warning) = match fill_variables(&url.value, &vars) {
            Ok(expanded) => (expanded, None),
            Err(e) => (url.value.clone(), Some(e.to_string())),
        };

        // The existing digest is about to be replaced anyway, so a malformed
        // one only loses the algorithm inference
        let hash_kind = hash
            .as_ref()
            .and_then(|f| ChecksumKind::from_hex_str(&f.value).ok())
            .unwrap_or(ChecksumKind::Sha256);

        Ok(Pacscript {
            path: path.to_owned(),
            pkgname,
            maintainer,
            version,
            url,
            expanded_url,
            expand_warning,
            hash,
            hash_kind,
            repology,
            lines,
            trailing_newline: data.ends_with('\n'),
        })
    }

    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.pkgname)
    }
}

fn default_pkgname(stem: &str) -> String {
    for suffix in ["-bin", "-deb", "-app"] {
        if let Some(base) = stem.strip_suffix(suffix) {
            return base.to_string();
        }
    }
    stem.to_string()
}

fn is_var_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn var_name(i: &str) -> IResult<&str, &str> {
    i.split_at_position1_complete(|c| !is_var_name_char(c), ErrorKind::Char)
}

fn double_quoted(i: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"'))(i)
}

fn single_quoted(i: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c| c == '\''), char('\''))(i)
}

fn bare_value(i: &str) -> IResult<&str, &str> {
    take_till(|c: char| c.is_whitespace() || c == '#')(i)
}

fn assignment(i: &str) -> IResult<&str, (&str, &str)> {
    let (i, name) = var_name(i)?;
    let (i, _) = char('=')(i)?;
    let (i, value) = alt((double_quoted, single_quoted, bare_value))(i)?;
    Ok((i, (name, value)))
}

/// Collect the quoted elements of a `repology=( ... )` array, which may span
/// multiple lines. Returns the elements and the index of the closing line.
fn parse_array(lines: &[String], start: usize, first_rest: &str) -> Result<(Vec<String>, usize)> {
    let mut elements = Vec::new();
    let mut no = start;
    let mut rest = first_rest.to_string();
    loop {
        let (closed, ok) = scan_array_fragment(&rest, &mut elements);
        if !ok {
            bail!("Unparsable array element");
        }
        if closed {
            return Ok((elements, no));
        }
        no += 1;
        match lines.get(no) {
            Some(line) => rest = line.trim().to_string(),
            None => bail!("Array is never closed"),
        }
    }
}

/// Returns (closed, parse_ok).
fn scan_array_fragment(fragment: &str, elements: &mut Vec<String>) -> (bool, bool) {
    let mut i = fragment;
    loop {
        i = i.trim_start();
        if i.is_empty() || i.starts_with('#') {
            return (false, true);
        }
        if let Ok((_, _)) = char::<_, Error<&str>>(')')(i) {
            return (true, true);
        }
        match alt::<_, _, Error<&str>, _>((double_quoted, single_quoted))(i) {
            Ok((remaining, element)) => {
                elements.push(element.to_string());
                i = remaining;
            }
            Err(_) => return (false, false),
        }
    }
}

fn fill_variables(template: &str, vars: &HashMap<&str, &str>) -> Result<String> {
    lazy_static! {
        static ref EXPANSION: Regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    }

    let mut unknown = Vec::new();
    let res = EXPANSION.replace_all(template, |caps: &Captures| {
        let name = caps.get(1).unwrap().as_str();
        match vars.get(name) {
            Some(value) => (*value).to_string(),
            None => {
                unknown.push(name.to_owned());
                String::new()
            }
        }
    });

    if !unknown.is_empty() {
        bail!("Unknown variable: {}", unknown.join(", "));
    }

    Ok(res.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"pkgname="hugo"
version="0.101.0"
url="https://github.com/gohugoio/hugo/releases/download/v${version}/hugo_${version}_Linux-64bit.deb"
hash="2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
maintainer="somebody <somebody@example.com>"
repology=("project: hugo" "aur: ignore")

# install instructions follow
"#;

    #[test]
    fn parses_fields() {
        let ps = Pacscript::parse(Path::new("hugo-bin.pacscript"), SAMPLE).unwrap();
        assert_eq!(ps.pkgname, "hugo");
        assert_eq!(ps.version.value, "0.101.0");
        assert_eq!(ps.version.line_no, 1);
        assert_eq!(ps.hash.as_ref().unwrap().line_no, 3);
        assert_eq!(ps.hash_kind, ChecksumKind::Sha256);
        assert_eq!(ps.maintainer, "somebody <somebody@example.com>");
        assert_eq!(
            ps.repology,
            vec!["project: hugo".to_string(), "aur: ignore".to_string()]
        );
        assert_eq!(
            ps.expanded_url,
            "https://github.com/gohugoio/hugo/releases/download/v0.101.0/hugo_0.101.0_Linux-64bit.deb"
        );
        assert!(ps.expand_warning.is_none());
        assert!(ps.trailing_newline);
    }

    #[test]
    fn pkgname_defaults_to_stem() {
        let src = "version=\"1.0\"\nurl=\"https://example.com/1.0.tar.gz\"\n";
        let ps = Pacscript::parse(Path::new("foo-bin.pacscript"), src).unwrap();
        assert_eq!(ps.pkgname, "foo");
    }

    #[test]
    fn multiline_repology_array() {
        let src = "version=\"1.0\"\nurl=\"https://example.com/1.0.tar.gz\"\nrepology=(\n    \"project: foo\"\n    \"debian_*: require\"\n)\n";
        let ps = Pacscript::parse(Path::new("foo.pacscript"), src).unwrap();
        assert_eq!(
            ps.repology,
            vec!["project: foo".to_string(), "debian_*: require".to_string()]
        );
    }

    #[test]
    fn unknown_variable_keeps_raw_url() {
        let src = "version=\"1.0\"\nurl=\"https://example.com/${flavor}/1.0.tar.gz\"\n";
        let ps = Pacscript::parse(Path::new("foo.pacscript"), src).unwrap();
        assert_eq!(ps.expanded_url, ps.url.value);
        assert!(ps.expand_warning.is_some());
    }

    #[test]
    fn missing_version_is_an_error() {
        let src = "url=\"https://example.com/1.0.tar.gz\"\n";
        assert!(Pacscript::parse(Path::new("foo.pacscript"), src).is_err());
    }

    #[test]
    fn assignment_variants() {
        assert_eq!(
            assignment("version=\"1.0\"").unwrap().1,
            ("version", "1.0")
        );
        assert_eq!(assignment("version='1.0'").unwrap().1, ("version", "1.0"));
        assert_eq!(assignment("version=1.0 # x").unwrap().1, ("version", "1.0"));
    }
}
