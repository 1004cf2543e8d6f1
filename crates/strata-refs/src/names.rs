//! Branch name validation.
//!
//! Branch names become file names under `branches/`, so the rules exist to
//! prevent path traversal and filesystem ambiguity:
//! - Must be non-empty
//! - Must not contain whitespace, `/`, `\`, `~`, `^`, `:`, `?`, `*`, `[`
//! - Must not contain `..`
//! - Must not start with `.` or `-`

use crate::error::{RefError, RefResult};

/// Characters that are forbidden anywhere in a branch name. `/` is included
/// because branch files are flat: one file directly under `branches/`.
const FORBIDDEN_CHARS: &[char] = &[
    ' ', '\t', '\n', '\r', '/', '\\', '~', '^', ':', '?', '*', '[',
];

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use strata_refs::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature-x").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad/name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> RefResult<()> {
    if name.is_empty() {
        return Err(RefError::InvalidBranchName {
            name: name.to_string(),
            reason: "branch name must not be empty".into(),
        });
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(RefError::InvalidBranchName {
                name: name.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }
    }

    if name.contains("..") {
        return Err(RefError::InvalidBranchName {
            name: name.to_string(),
            reason: "must not contain '..'".into(),
        });
    }

    if name.starts_with('.') || name.starts_with('-') {
        return Err(RefError::InvalidBranchName {
            name: name.to_string(),
            reason: "must not start with '.' or '-'".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        for name in ["main", "feature-x", "release_1.2", "dev2"] {
            assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_names() {
        for name in [
            "",
            "has space",
            "feature/auth",
            "back\\slash",
            "dot..dot",
            ".hidden",
            "-flag",
            "colon:name",
            "glob*",
        ] {
            assert!(
                matches!(
                    validate_branch_name(name),
                    Err(RefError::InvalidBranchName { .. })
                ),
                "{name:?} should be invalid"
            );
        }
    }
}
