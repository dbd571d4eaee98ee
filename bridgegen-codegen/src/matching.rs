//! Handler name splitting and overload selection.
//!
//! Thrift has no overloading, so the skeleton spells overloads of one manager
//! method as `<Name>_<Hint>` (`SetValue_Bool`, `SetValue_Int32`). The hint is
//! matched case-insensitively against the rendered type of each overload's
//! last argument.

use bridgegen_ir::Method;
use regex::Regex;
use serde::Serialize;

use crate::error::ResolveError;

/// A handler method name split into the manager method it targets and the
/// optional overload hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitName<'n> {
    pub target: &'n str,
    pub hint: Option<&'n str>,
}

/// Split a handler method name with the disambiguation pattern.
///
/// Capture 1 is the target name, capture 2 the hint. Names the pattern does
/// not match target the manager method of the same name.
pub fn split_name<'n>(pattern: &Regex, name: &'n str) -> SplitName<'n> {
    let Some(caps) = pattern.captures(name) else {
        return SplitName { target: name, hint: None };
    };
    let target = caps.get(1).map(|m| m.as_str()).unwrap_or(name);
    let hint = caps.get(2).map(|m| m.as_str()).filter(|h| !h.is_empty());
    SplitName { target, hint }
}

/// The manager method chosen for a handler method.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'m> {
    pub method: &'m Method,
    /// Number of overloads whose last argument matched the hint. More than one
    /// means the last declared overload was taken.
    pub matches: usize,
}

impl Selection<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// Pick the manager overload for a handler method.
///
/// Returns `Ok(None)` when the manager has no public method with the target
/// name; the caller leaves that handler method untouched.
pub fn select_overload<'m>(
    handler: &str,
    split: &SplitName<'_>,
    candidates: &[&'m Method],
) -> Result<Option<Selection<'m>>, ResolveError> {
    match candidates {
        [] => Ok(None),
        [only] => Ok(Some(Selection {
            method: *only,
            matches: 1,
        })),
        _ => {
            let Some(hint) = split.hint else {
                return Err(ResolveError::NoDisambiguationHint {
                    method: handler.to_string(),
                    target: split.target.to_string(),
                    count: candidates.len(),
                });
            };
            let needle = hint.to_lowercase();
            let matching: Vec<&'m Method> = candidates
                .iter()
                .copied()
                .filter(|m| last_argument_matches(m, &needle))
                .collect();
            match matching.last().copied() {
                Some(method) => Ok(Some(Selection {
                    method,
                    matches: matching.len(),
                })),
                None => Err(ResolveError::UnresolvedTarget {
                    method: handler.to_string(),
                    target: split.target.to_string(),
                    hint: hint.to_string(),
                }),
            }
        }
    }
}

fn last_argument_matches(method: &Method, needle: &str) -> bool {
    method
        .params
        .last()
        .is_some_and(|p| p.ty.spelling.to_lowercase().contains(needle))
}
