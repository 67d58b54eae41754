use super::filter::FiltrateRecord;
use crate::actions::error::UpdateError;
use crate::types::vercmp;

use std::collections::HashMap;

/// The version chosen from the filtrate, with the records that support it
/// kept around for diagnostics.
#[derive(Debug, Clone)]
pub struct ResolvedVersion {
    pub version: String,
    pub supporters: Vec<FiltrateRecord>,
}

/// Majority vote over normalized version strings: the version packaged by
/// the most repositories wins, since independent packagers agreeing is a
/// stronger freshness signal than any single repository's claim. Ties go to
/// the highest version under the total order, so identical filtrates always
/// resolve identically.
pub fn resolve(filtrate: &[FiltrateRecord]) -> Result<ResolvedVersion, UpdateError> {
    if filtrate.is_empty() {
        return Err(UpdateError::NoPackageFound);
    }

    let mut groups: HashMap<&str, Vec<&FiltrateRecord>> = HashMap::new();
    for record in filtrate {
        groups.entry(&record.version).or_default().push(record);
    }

    let (version, supporters) = groups
        .into_iter()
        .max_by(|(va, a), (vb, b)| {
            a.len()
                .cmp(&b.len())
                .then_with(|| vercmp(va, vb))
                // vercmp treats e.g. "1.0" and "1.00" as equal; fall back to
                // plain string order so the pick stays deterministic
                .then_with(|| va.cmp(vb))
        })
        .unwrap();

    Ok(ResolvedVersion {
        version: version.to_string(),
        supporters: supporters.into_iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtrate(entries: &[(&str, &str)]) -> Vec<FiltrateRecord> {
        entries
            .iter()
            .map(|(repo, version)| FiltrateRecord {
                repo: repo.to_string(),
                name: "pkg".to_string(),
                version: version.to_string(),
            })
            .collect()
    }

    #[test]
    fn majority_wins() {
        let records = filtrate(&[("a", "1.2"), ("b", "1.2"), ("c", "1.1")]);
        let resolved = resolve(&records).unwrap();
        assert_eq!(resolved.version, "1.2");
        assert_eq!(resolved.supporters.len(), 2);
    }

    #[test]
    fn majority_beats_numeric_max() {
        let records = filtrate(&[("a", "1.2"), ("b", "1.2"), ("c", "9.9")]);
        assert_eq!(resolve(&records).unwrap().version, "1.2");
    }

    #[test]
    fn tie_breaks_to_highest_version() {
        let records = filtrate(&[("a", "2.0"), ("b", "1.9")]);
        for _ in 0..16 {
            assert_eq!(resolve(&records).unwrap().version, "2.0");
        }
        let records = filtrate(&[("a", "1.9"), ("b", "1.10")]);
        assert_eq!(resolve(&records).unwrap().version, "1.10");
    }

    #[test]
    fn empty_filtrate_is_no_package_found() {
        assert_eq!(resolve(&[]).unwrap_err(), UpdateError::NoPackageFound);
    }
}
