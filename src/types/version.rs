use std::cmp::Ordering;

/// How a pacscript's current version relates to the resolved upstream version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    Outdated,
    UpToDate,
    Newer,
}

pub fn version_status(current: &str, latest: &str) -> VersionStatus {
    match vercmp(current, latest) {
        Ordering::Less => VersionStatus::Outdated,
        Ordering::Equal => VersionStatus::UpToDate,
        Ordering::Greater => VersionStatus::Newer,
    }
}

/// dpkg style version comparison.
/// Check https://www.debian.org/doc/debian-policy/ch-controlfields.html#version
///
/// Alternates between non-digit and digit runs. Non-digit runs compare
/// character-wise with `~` sorting before everything (including end of
/// string) and letters before non-letters; digit runs compare numerically.
/// This is a total order over arbitrary version strings, so it doubles as
/// the deterministic tie-break for the resolver.
pub fn vercmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        // Non-digit run
        while (i < a.len() && !a[i].is_ascii_digit()) || (j < b.len() && !b[j].is_ascii_digit()) {
            let ra = if i < a.len() && !a[i].is_ascii_digit() {
                char_rank(a[i])
            } else {
                0
            };
            let rb = if j < b.len() && !b[j].is_ascii_digit() {
                char_rank(b[j])
            } else {
                0
            };
            match ra.cmp(&rb) {
                Ordering::Equal => (),
                ord => return ord,
            }
            if i < a.len() && !a[i].is_ascii_digit() {
                i += 1;
            }
            if j < b.len() && !b[j].is_ascii_digit() {
                j += 1;
            }
        }

        // Digit run, compared numerically (leading zeroes are insignificant)
        while i < a.len() && a[i] == b'0' {
            i += 1;
        }
        while j < b.len() && b[j] == b'0' {
            j += 1;
        }
        let da = digit_run(a, i);
        let db = digit_run(b, j);
        match da.len().cmp(&db.len()).then_with(|| da.cmp(db)) {
            Ordering::Equal => (),
            ord => return ord,
        }
        i += da.len();
        j += db.len();
    }

    Ordering::Equal
}

/// `~` sorts before end of string, letters before everything else.
fn char_rank(c: u8) -> i32 {
    if c == b'~' {
        -1
    } else if c.is_ascii_alphabetic() {
        c as i32
    } else {
        c as i32 + 256
    }
}

fn digit_run(s: &[u8], start: usize) -> &[u8] {
    let mut end = start;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    &s[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_segments() {
        assert_eq!(vercmp("1.2", "1.10"), Ordering::Less);
        assert_eq!(vercmp("2.0", "1.9"), Ordering::Greater);
        assert_eq!(vercmp("1.2.3", "1.2.3"), Ordering::Equal);
        assert_eq!(vercmp("1.02", "1.2"), Ordering::Equal);
        assert_eq!(vercmp("10", "9"), Ordering::Greater);
    }

    #[test]
    fn tilde_sorts_first() {
        assert_eq!(vercmp("1.0~beta", "1.0"), Ordering::Less);
        assert_eq!(vercmp("1.0~rc1", "1.0~rc2"), Ordering::Less);
    }

    #[test]
    fn letters_before_symbols() {
        assert_eq!(vercmp("1.0a", "1.0+"), Ordering::Less);
        assert_eq!(vercmp("1.0", "1.0a"), Ordering::Less);
    }

    #[test]
    fn mixed_segments() {
        assert_eq!(vercmp("0.5.7", "0.5.7-2"), Ordering::Less);
        assert_eq!(vercmp("2021.08", "2021.11"), Ordering::Less);
        assert_eq!(vercmp("1.8.0+git20210608", "1.8.0"), Ordering::Greater);
    }

    #[test]
    fn status_classification() {
        assert_eq!(version_status("1.0", "1.1"), VersionStatus::Outdated);
        assert_eq!(version_status("1.1", "1.1"), VersionStatus::UpToDate);
        assert_eq!(version_status("1.2", "1.1"), VersionStatus::Newer);
    }
}
