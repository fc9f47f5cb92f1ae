//! Transient notifications shown to the moderator.

use crate::application::board::ApiFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(NoticeKind::Success),
            "error" => Some(NoticeKind::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Notice for a failed action or page load.
    pub fn from_failure(failure: &ApiFailure) -> Self {
        match failure {
            ApiFailure::NetworkUnreachable(_) => Self::error("Network problem, please try again."),
            ApiFailure::AuthExpired => Self::error("Your session has expired."),
            ApiFailure::BadRequest(_) => Self::error("The server rejected the submitted values."),
            ApiFailure::ServerFault { .. } => Self::error("The server ran into a problem."),
        }
    }

    /// Notice for a failed credential request on the login view.
    pub fn from_login_failure(failure: &ApiFailure) -> Self {
        match failure {
            ApiFailure::NetworkUnreachable(_) => Self::error("Network problem, please try again."),
            ApiFailure::AuthExpired => Self::error("Wrong passphrase."),
            ApiFailure::BadRequest(_) | ApiFailure::ServerFault { .. } => {
                Self::error("Something went wrong.")
            }
        }
    }
}
