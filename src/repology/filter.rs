use super::RemoteRecord;
use crate::actions::error::UpdateError;

use regex::Regex;

/// What to do with records from a matching repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Reject all records of this repository.
    Ignore,
    /// If any required repository has records, only records from required
    /// repositories stay eligible.
    Require,
    /// Drop everything from the last occurrence of the delimiter before the
    /// version is counted or compared. Does not affect acceptance.
    Strip(String),
}

impl Rule {
    fn parse(value: &str) -> Option<Self> {
        if value == "ignore" {
            return Some(Rule::Ignore);
        }
        if value == "require" {
            return Some(Rule::Require);
        }
        if let Some(delim) = value.strip_prefix("strip:") {
            let delim = delim.trim();
            if !delim.is_empty() {
                return Some(Rule::Strip(delim.to_string()));
            }
        }
        None
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Ignore => f.write_str("ignore"),
            Rule::Require => f.write_str("require"),
            Rule::Strip(delim) => write!(f, "strip: {}", delim),
        }
    }
}

/// A record that survived filtering, with its version normalized for
/// counting and comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiltrateRecord {
    pub repo: String,
    pub name: String,
    pub version: String,
}

/// Compiled form of a pacscript's `repology=()` array.
#[derive(Debug)]
pub struct FilterSpec {
    pub project: String,
    rules: Vec<(String, Regex, Rule)>,
}

impl FilterSpec {
    /// Compile the raw array elements. Each element is `key: value` where
    /// `project` names the Repology project and every other key is a
    /// repository-name pattern (exact or `*` wildcard) mapped to a rule.
    pub fn compile(entries: &[String]) -> Result<Self, UpdateError> {
        let mut project = None;
        let mut rules = Vec::new();

        for entry in entries {
            let (key, value) = entry
                .split_once(':')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| UpdateError::InvalidFilterSpec(entry.clone()))?;
            if key.is_empty() || value.is_empty() {
                return Err(UpdateError::InvalidFilterSpec(entry.clone()));
            }
            if key == "project" {
                project = Some(value.to_string());
                continue;
            }
            let rule = Rule::parse(value)
                .ok_or_else(|| UpdateError::InvalidFilterSpec(key.to_string()))?;
            let matcher = compile_pattern(key)
                .map_err(|_| UpdateError::InvalidFilterSpec(key.to_string()))?;
            rules.push((key.to_string(), matcher, rule));
        }

        let project =
            project.ok_or_else(|| UpdateError::InvalidFilterSpec("project".to_string()))?;
        Ok(FilterSpec { project, rules })
    }

    /// First matching pattern wins.
    pub fn rule_for(&self, repo: &str) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|(_, matcher, _)| matcher.is_match(repo))
            .map(|(_, _, rule)| rule)
    }

    /// Apply the rules to a fetched record set.
    pub fn apply(&self, records: &[RemoteRecord]) -> Vec<FiltrateRecord> {
        // require narrows the universe only when a required repo has records
        let require_active = records
            .iter()
            .any(|r| matches!(self.rule_for(&r.repo), Some(Rule::Require)));

        let mut filtrate = Vec::new();
        for record in records {
            let rule = self.rule_for(&record.repo);
            match rule {
                Some(Rule::Ignore) => continue,
                Some(Rule::Require) => (),
                _ => {
                    if require_active {
                        continue;
                    }
                }
            }
            let version = match rule {
                Some(Rule::Strip(delim)) => strip_last(&record.version, delim),
                _ => record.version.clone(),
            };
            filtrate.push(FiltrateRecord {
                repo: record.repo.clone(),
                name: record.name.clone(),
                version,
            });
        }
        filtrate
    }

    /// Human-readable rule listing for `--show-repology`.
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut out = vec![("project".to_string(), self.project.clone())];
        for (pattern, _, rule) in &self.rules {
            out.push((pattern.clone(), rule.to_string()));
        }
        out
    }
}

fn strip_last(version: &str, delim: &str) -> String {
    match version.rfind(delim) {
        Some(i) => version[..i].to_string(),
        None => version.to_string(),
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expr = String::from("^");
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 {
            expr.push_str(".*");
        }
        expr.push_str(&regex::escape(part));
    }
    expr.push('$');
    Regex::new(&expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(repo: &str, version: &str) -> RemoteRecord {
        RemoteRecord {
            repo: repo.to_string(),
            name: "pkg".to_string(),
            version: version.to_string(),
        }
    }

    fn compile(entries: &[&str]) -> FilterSpec {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        FilterSpec::compile(&entries).unwrap()
    }

    #[test]
    fn project_is_required() {
        let err = FilterSpec::compile(&["aur: ignore".to_string()]).unwrap_err();
        assert_eq!(err, UpdateError::InvalidFilterSpec("project".to_string()));
    }

    #[test]
    fn invalid_rule_names_the_key() {
        let entries = vec!["project: foo".to_string(), "aur: frobnicate".to_string()];
        let err = FilterSpec::compile(&entries).unwrap_err();
        assert_eq!(err, UpdateError::InvalidFilterSpec("aur".to_string()));
    }

    #[test]
    fn ignore_rejects_matching_repos() {
        let spec = compile(&["project: foo", "aur: ignore"]);
        let records = vec![record("aur", "2.0"), record("debian_11", "1.9")];
        let filtrate = spec.apply(&records);
        assert_eq!(filtrate.len(), 1);
        assert_eq!(filtrate[0].repo, "debian_11");
    }

    #[test]
    fn require_narrows_the_universe() {
        // Y alone would win the majority, but X is required and has records
        let spec = compile(&["project: foo", "repo_x: require"]);
        let records = vec![
            record("repo_x", "1.2"),
            record("repo_y", "1.1"),
            record("repo_y_old", "1.1"),
        ];
        let filtrate = spec.apply(&records);
        assert_eq!(filtrate.len(), 1);
        assert_eq!(filtrate[0].repo, "repo_x");
    }

    #[test]
    fn require_is_inert_without_records() {
        let spec = compile(&["project: foo", "repo_x: require"]);
        let records = vec![record("repo_y", "1.1")];
        let filtrate = spec.apply(&records);
        assert_eq!(filtrate.len(), 1);
        assert_eq!(filtrate[0].repo, "repo_y");
    }

    #[test]
    fn strip_normalizes_but_keeps_acceptance() {
        let spec = compile(&["project: foo", "fedora_*: strip: -"]);
        let records = vec![record("fedora_36", "1.2-3"), record("debian_11", "1.2")];
        let filtrate = spec.apply(&records);
        assert_eq!(filtrate.len(), 2);
        assert_eq!(filtrate[0].version, "1.2");
        assert_eq!(filtrate[1].version, "1.2");
    }

    #[test]
    fn wildcard_patterns() {
        let spec = compile(&["project: foo", "debian_*: ignore"]);
        assert_eq!(spec.rule_for("debian_11"), Some(&Rule::Ignore));
        assert_eq!(spec.rule_for("debian_unstable"), Some(&Rule::Ignore));
        assert_eq!(spec.rule_for("ubuntu_22_04"), None);
        // No unanchored matching
        assert_eq!(spec.rule_for("not_debian_11"), None);
    }

    #[test]
    fn unfiltered_repos_pass_through_unchanged() {
        let spec = compile(&["project: foo"]);
        let records = vec![record("aur", "2.0~beta1")];
        let filtrate = spec.apply(&records);
        assert_eq!(filtrate[0].version, "2.0~beta1");
    }
}
