// error.rs -- why a browser operation did nothing

use thiserror::Error;

/// Every failure the server browser can hit. None of them are fatal: the
/// browser absorbs them and at most shows a message box or grays a button.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The user typed something the address parser refused.
    #[error("invalid address: {0}")]
    MalformedAddress(String),

    /// A discovery reply for a server that is already listed.
    #[error("server already listed")]
    DuplicateDiscovery,

    /// A discovery reply from a server running another game.
    #[error("server runs game folder \"{0}\"")]
    ForeignGameFolder(String),

    /// A discovery reply while the browser is hidden or not initialized.
    #[error("server browser is not active")]
    StaleViewState,

    /// A list file that does not exist yet.
    #[error("{0} not found")]
    PersistenceMiss(String),

    /// The host refused to write a list file.
    #[error("couldn't write {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, BrowserError>;
