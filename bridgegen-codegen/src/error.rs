//! Fatal resolution and patching errors.

use thiserror::Error;

/// A handler method that cannot be bridged to the manager.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("class '{0}' not found in the parsed sources")]
    ClassNotFound(String),

    #[error(
        "method '{method}': '{target}' is overloaded {count} times; add a disambiguation hint to the handler method name"
    )]
    NoDisambiguationHint {
        method: String,
        target: String,
        count: usize,
    },

    #[error("method '{method}': no overload of '{target}' has a last argument matching hint '{hint}'")]
    UnresolvedTarget {
        method: String,
        target: String,
        hint: String,
    },

    #[error("method '{method}': cannot bind argument '{argument}' of '{target}'")]
    UnboundArgument {
        method: String,
        target: String,
        argument: String,
    },

    #[error(
        "method '{method}': callback argument '{argument}' of '{target}' has type '{ty}', which is not a function pointer"
    )]
    CallbackNotFunctionPointer {
        method: String,
        target: String,
        argument: String,
        ty: String,
    },
}

/// Two edits in one patch set touch the same bytes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("overlapping edits: '{first}' ({first_start}..{first_end}) and '{second}' ({second_start}..{second_end})")]
pub struct PatchError {
    pub first: String,
    pub first_start: usize,
    pub first_end: usize,
    pub second: String,
    pub second_start: usize,
    pub second_end: usize,
}
