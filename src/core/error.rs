use std::io;

#[derive(thiserror::Error, Debug)]
pub enum GuardError {
    #[error("input error: {0}")]
    Input(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("db error: {0}")]
    Db(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for GuardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GuardError::Timeout
        } else if err.is_connect() {
            GuardError::Network(err.to_string())
        } else if err.is_status() {
            GuardError::Http(err.to_string())
        } else {
            GuardError::Network(err.to_string())
        }
    }
}

impl From<rusqlite::Error> for GuardError {
    fn from(err: rusqlite::Error) -> Self {
        GuardError::Db(err.to_string())
    }
}

impl From<regex::Error> for GuardError {
    fn from(err: regex::Error) -> Self {
        GuardError::Config(err.to_string())
    }
}
