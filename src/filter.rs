use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};

/// Include/exclude globs applied to fully-qualified class names.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    only: Option<GlobMatcher>,
    not: Option<GlobMatcher>,
}

impl ClassFilter {
    pub fn new(only: Option<&str>, not: Option<&str>) -> Result<Self> {
        Ok(Self {
            only: only.map(compile).transpose()?,
            not: not.map(compile).transpose()?,
        })
    }

    pub fn is_match(&self, class_name: &str) -> bool {
        if let Some(only) = &self.only
            && !only.is_match(class_name)
        {
            return false;
        }
        if let Some(not) = &self.not
            && not.is_match(class_name)
        {
            return false;
        }
        true
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern).with_context(|| format!("invalid class glob: {pattern}"))?;
    Ok(glob.compile_matcher())
}
