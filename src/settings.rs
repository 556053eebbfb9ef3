use anyhow::{bail, Context, Error};
use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};

/// Receives the token once the flow has produced it.
pub trait TokenSink {
    fn persist(&self, token: &str) -> Result<(), Error>;
}

/// A JSON settings document with a `"<key>": "<value>",` line.
///
/// The line is rewritten in place as text so the rest of the file, comments
/// and formatting included, is untouched.
pub struct SettingsFile {
    path: PathBuf,
    key: String,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> SettingsFile {
        SettingsFile {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn pattern(&self) -> Result<Regex, Error> {
        let re = format!(r#""{}": ".*","#, regex::escape(&self.key));
        Regex::new(&re).context("compile settings pattern")
    }

    /// Returns `contents` with the key's value replaced by `token`.
    pub fn substitute(&self, contents: &str, token: &str) -> Result<String, Error> {
        let re = self.pattern()?;
        if !re.is_match(contents) {
            bail!("no \"{}\" entry in {}", self.key, self.path.display());
        }
        let line = format!(r#""{}": "{}","#, self.key, token);
        Ok(re.replace_all(contents, NoExpand(&line)).into_owned())
    }
}

impl TokenSink for SettingsFile {
    fn persist(&self, token: &str) -> Result<(), Error> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let updated = self.substitute(&contents, token)?;
        fs::write(&self.path, updated).with_context(|| format!("write {}", self.path.display()))
    }
}
