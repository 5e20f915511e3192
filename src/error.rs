use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication rejected: the session cookie or XSRF token is invalid")]
    Auth,

    #[error("Request failed with HTTP {status}: {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error must end the whole run.
    ///
    /// Every later call would be rejected the same way once credentials are
    /// refused, so an auth failure is never downgraded to a per-asset outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Auth)
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Toml(_) => 2,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
