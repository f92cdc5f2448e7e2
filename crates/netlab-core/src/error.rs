// ── Engine error types ──
//
// User-visible errors from command dispatch. These are dialect-neutral --
// the vendor profile renders each kind into Huawei- or Cisco-phrased
// console text. None are fatal: the device and its console stay usable
// after every error.

use thiserror::Error;

use crate::model::ViewKind;

/// Unified error type for one command dispatch.
///
/// `UnknownCommand` means the registry matched nothing. The middle four
/// variants are validation failures and guarantee zero device mutation
/// (the executor only runs `execute` after a passing `validate`).
/// `Precondition` is the execution-time kind: arguments were valid but a
/// runtime precondition established by some earlier command is unmet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognized command: {line}")]
    UnknownCommand { line: String },

    #[error("command is only available in {required} (current: {actual})")]
    WrongView { required: ViewKind, actual: ViewKind },

    #[error("missing argument: {what}")]
    MissingArgument { what: &'static str },

    #[error("invalid {what}: '{value}'")]
    InvalidArgument { what: &'static str, value: String },

    #[error("{what} {identifier} does not exist")]
    NotFound {
        what: &'static str,
        identifier: String,
    },

    #[error("{message}")]
    Precondition { message: String },
}

impl CommandError {
    /// True for the validation subkinds that guarantee zero mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::WrongView { .. }
                | Self::MissingArgument { .. }
                | Self::InvalidArgument { .. }
                | Self::NotFound { .. }
        )
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }
}
