use std::fmt;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

pub type WrapRes<T> = Result<T, WrapError>;

#[derive(Debug)]
pub enum WrapError {
    Connect(ConnectError),
    Conn(ConnectionError),
    Reply(ReplyError),
    Id(ReplyOrIdError),
    Sys(nix::Error),
    NoDesktop,
    NoCommand,
}

impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "Couldn't open display: {}", e),
            Self::Conn(e) => write!(f, "X connection failed: {}", e),
            Self::Reply(e) => write!(f, "X request failed: {}", e),
            Self::Id(e) => write!(f, "X resource allocation failed: {}", e),
            Self::Sys(e) => write!(f, "{}", e),
            Self::NoDesktop => write!(f, "Couldn't find desktop window."),
            Self::NoCommand => write!(f, "No command specified. Use -h to get help."),
        }
    }
}

impl std::error::Error for WrapError {}

impl From<ConnectError> for WrapError {
    fn from(other: ConnectError) -> Self {
        Self::Connect(other)
    }
}

impl From<ConnectionError> for WrapError {
    fn from(other: ConnectionError) -> Self {
        Self::Conn(other)
    }
}

impl From<ReplyError> for WrapError {
    fn from(other: ReplyError) -> Self {
        Self::Reply(other)
    }
}

impl From<ReplyOrIdError> for WrapError {
    fn from(other: ReplyOrIdError) -> Self {
        Self::Id(other)
    }
}

impl From<nix::Error> for WrapError {
    fn from(other: nix::Error) -> Self {
        Self::Sys(other)
    }
}
