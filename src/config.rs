use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(about, version, author)]
pub struct Opts {
    #[clap(
        short = 'r',
        long = "show-repology",
        help = "Show the compiled repology filters and filtrate, then exit without changing anything"
    )]
    pub show_repology: bool,
    #[clap(short, long, help = "Print additional debug information")]
    pub debug: bool,
    #[clap(short, long, help = "Answer yes to all prompts")]
    pub yes: bool,
    #[clap(
        required = true,
        help = "The pacscripts to update",
        parse(from_os_str)
    )]
    pub pacscripts: Vec<PathBuf>,
}

/// Reject inputs pacup cannot handle before any network traffic happens.
pub fn validate_pacscript_paths(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if path.extension().map_or(true, |ext| ext != "pacscript") {
            bail!(
                "{} doesn't have a .pacscript extension",
                path.display()
            );
        }
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if stem.ends_with("-git") {
            bail!(
                "{} tracks a git branch and has no upstream version to resolve",
                path.display()
            );
        }
        if !path.is_file() {
            bail!("{} doesn't exist or is not a file", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_extension() {
        assert!(validate_pacscript_paths(&[PathBuf::from("foo.sh")]).is_err());
        assert!(validate_pacscript_paths(&[PathBuf::from("foo")]).is_err());
    }

    #[test]
    fn rejects_git_pacscripts() {
        assert!(validate_pacscript_paths(&[PathBuf::from("foo-git.pacscript")]).is_err());
    }
}
