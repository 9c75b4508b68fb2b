//! Line preprocessing
//!
//! Downcases ASCII letters and strips whitespace outside parenthesised
//! comments, leaving comments verbatim. Detects the leading `/` that marks a
//! block-delete line.

use crate::error::{Error, LexError};

/// Result of preprocessing one source line.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedLine {
    /// Downcased, whitespace-stripped line with comments preserved verbatim.
    pub text: String,
    /// `true` if the line began with `/` (skip execution, but still parse).
    pub block_delete: bool,
}

/// Preprocess one raw source line.
///
/// # Errors
/// Returns [`LexError::NestedComment`] if `(` appears inside a comment, and
/// [`LexError::UnclosedComment`] if the line ends while inside one.
pub fn preprocess_line(raw: &str) -> Result<PreprocessedLine, Error> {
    let mut out = String::with_capacity(raw.len());
    let mut in_comment = false;
    let mut seen_non_blank = false;
    let mut block_delete = false;

    for ch in raw.trim_end_matches(['\r', '\n']).chars() {
        if in_comment {
            out.push(ch);
            if ch == '(' {
                return Err(LexError::NestedComment.into());
            }
            if ch == ')' {
                in_comment = false;
            }
            continue;
        }

        if ch == '(' {
            in_comment = true;
            out.push(ch);
            continue;
        }

        if ch == ' ' || ch == '\t' {
            continue;
        }

        if !seen_non_blank {
            seen_non_blank = true;
            if ch == '/' {
                block_delete = true;
                continue;
            }
        }

        out.push(ch.to_ascii_lowercase());
    }

    if in_comment {
        return Err(LexError::UnclosedComment.into());
    }

    Ok(PreprocessedLine {
        text: out,
        block_delete,
    })
}
