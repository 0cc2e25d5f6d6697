use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("inconsistent match: {0}")]
    InconsistentMatch(String),

    #[error("connection to switch {datapath} closed")]
    ConnectionClosed { datapath: String },

    #[error("handshake failed: {0}")]
    Handshake(String),
}

pub type Result<T> = std::result::Result<T, Error>;
