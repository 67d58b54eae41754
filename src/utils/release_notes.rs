use reqwest::{header::USER_AGENT, Client};
use serde::Deserialize;

const UA: &str = concat!("pacup/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
}

/// Release notes for every release newer than `current`, newest first.
/// Only GitHub release pages are supported; anything else (or any API
/// hiccup) yields an empty list, since notes are a courtesy and never gate
/// the update.
pub async fn fetch(client: &Client, url: &str, current: &str) -> Vec<(String, String)> {
    let segments: Vec<&str> = url.split('/').collect();
    if segments.len() < 5 || segments[2] != "github.com" {
        return Vec::new();
    }
    let (owner, repo) = (segments[3], segments[4]);
    let api = format!("https://api.github.com/repos/{}/{}/releases", owner, repo);

    let resp = match client.get(&api).header(USER_AGENT, UA).send().await {
        Ok(resp) if resp.status().is_success() => resp,
        _ => return Vec::new(),
    };
    let releases: Vec<GithubRelease> = match resp.json().await {
        Ok(releases) => releases,
        Err(_) => return Vec::new(),
    };

    let mut notes = Vec::new();
    for release in releases {
        if normalize_tag(&release.tag_name) == current {
            break;
        }
        if let Some(body) = release.body {
            if !body.is_empty() {
                notes.push((release.tag_name, body));
            }
        }
    }
    notes
}

fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_normalization() {
        assert_eq!(normalize_tag("v1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("V1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("1.2.3"), "1.2.3");
    }
}
