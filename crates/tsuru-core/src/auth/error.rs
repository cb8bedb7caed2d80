use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("You must provide the password!")]
    EmptyPassword,

    #[error("You're not logged in!")]
    NotLoggedIn,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{0}")]
    Usage(String),

    #[error("Authentication scheme is missing the {0:?} setting")]
    MissingSchemeData(&'static str),

    #[error("Timed out waiting for the login callback")]
    CallbackTimeout,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
