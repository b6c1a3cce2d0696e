use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Environment variable naming a dex-tools installation root.
pub const DEXTOOLS_HOME: &str = "DEXTOOLS_HOME";

const DEFAULT_EXTRA_ARGS: [&str; 2] = ["-p", "-constants"];

#[cfg(not(windows))]
const DEX2JAR_CANDIDATES: &[&str] = &["d2j-dex2jar.sh", "dex2jar.sh", "dex2jar"];
#[cfg(windows)]
const DEX2JAR_CANDIDATES: &[&str] = &["d2j-dex2jar.sh", "dex2jar.sh", "dex2jar", "d2j-dex2jar.bat"];

/// Effective settings for one run, resolved from the command line and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub jar_file: PathBuf,
    pub extra_args: Vec<String>,
    pub only: Option<String>,
    pub not: Option<String>,
    pub dex2jar: Option<PathBuf>,
    pub javap: PathBuf,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Self {
        Self {
            jar_file: cli.jar_file.clone(),
            extra_args: normalize_extra_args(&cli.extra),
            only: cli.only.clone(),
            not: cli.not.clone(),
            dex2jar: resolve_dex2jar(cli),
            javap: cli.javap.clone(),
        }
    }
}

/// Maps the `^` placeholder back to `-`, falling back to the default javap flags.
pub fn normalize_extra_args(extra: &[String]) -> Vec<String> {
    if extra.is_empty() {
        return DEFAULT_EXTRA_ARGS.iter().map(|s| s.to_string()).collect();
    }
    extra.iter().map(|arg| arg.replace('^', "-")).collect()
}

pub fn resolve_dex2jar(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.dex2jar.clone() {
        return Some(p);
    }

    let home = env::var_os(DEXTOOLS_HOME).filter(|v| !v.is_empty())?;
    find_dex2jar_in(Path::new(&home))
}

pub fn find_dex2jar_in(root: &Path) -> Option<PathBuf> {
    DEX2JAR_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[test]
    fn extra_args_default_to_private_and_constants() {
        assert_eq!(normalize_extra_args(&[]), vec!["-p", "-constants"]);
    }

    #[test]
    fn caret_placeholder_becomes_dash() {
        let extra = vec!["^c".to_string(), "^^verbose".to_string(), "plain".to_string()];
        assert_eq!(normalize_extra_args(&extra), vec!["-c", "--verbose", "plain"]);
    }

    #[test]
    fn find_dex2jar_prefers_first_candidate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("dex2jar"), "")?;
        fs::write(dir.path().join("d2j-dex2jar.sh"), "")?;

        assert_eq!(
            find_dex2jar_in(dir.path()),
            Some(dir.path().join("d2j-dex2jar.sh"))
        );
        Ok(())
    }

    #[test]
    fn find_dex2jar_skips_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("d2j-dex2jar.sh"))?;
        fs::write(dir.path().join("dex2jar.sh"), "")?;

        assert_eq!(find_dex2jar_in(dir.path()), Some(dir.path().join("dex2jar.sh")));
        Ok(())
    }

    #[test]
    fn find_dex2jar_in_empty_root_is_none() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(find_dex2jar_in(dir.path()), None);
        Ok(())
    }

    #[test]
    fn explicit_dex2jar_wins() {
        let cli = Cli::parse_from(["jarwalk", "--dex2jar", "/opt/d2j/d2j-dex2jar.sh", "app.apk"]);
        let settings = Settings::resolve(&cli);
        assert_eq!(settings.dex2jar, Some(PathBuf::from("/opt/d2j/d2j-dex2jar.sh")));
        assert_eq!(settings.extra_args, vec!["-p", "-constants"]);
        assert_eq!(settings.jar_file, PathBuf::from("app.apk"));
    }
}
