use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://app.yinxiang.com";

/// Shown in place of a token when the account already has one.
pub const DEFAULT_NOTE_STORE_URL: &str = "https://app.yinxiang.com/shard/s12/notestore";

pub const DEFAULT_SETTINGS_PATH: &str = ".config/Code/User/settings.json";
pub const DEFAULT_SETTINGS_KEY: &str = "evermonkey.token";

pub const LOGIN_PATH: &str = "/Login.action";
pub const DEVELOPER_TOKEN_PATH: &str = "/api/DeveloperToken.action";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_2) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.132 Safari/537.36";

/// What to do when an expected form field is missing from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissPolicy {
    /// Log a warning and send the field as an empty string.
    Default,
    /// Abort the flow.
    Fail,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub note_store_url: String,
    /// Number of times an existing token may be revoked before giving up.
    pub max_revokes: u32,
    pub on_missing_field: MissPolicy,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            note_store_url: DEFAULT_NOTE_STORE_URL.to_string(),
            max_revokes: 2,
            on_missing_field: MissPolicy::Default,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), LOGIN_PATH)
    }

    pub fn developer_token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), DEVELOPER_TOKEN_PATH)
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `$HOME/.config/Code/User/settings.json`, if a home directory is known.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_SETTINGS_PATH))
}
