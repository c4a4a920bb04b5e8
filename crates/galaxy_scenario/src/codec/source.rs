//! Scratch line buffer for scenario scripts.
//!
//! Loading reads the whole source, checks that it is text and that its
//! braces are balanced, and only then hands out lines to the parse passes.
//! Nothing here touches a live scenario.

use crate::error::FormatError;
use std::path::Path;
use tracing::debug;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Lines of a structurally valid scenario script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceText {
    lines: Vec<String>,
}

impl SourceText {
    /// Reads and validates a script file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "📄 Scenario source read");
        Self::from_bytes(&bytes)
    }

    /// Validates raw bytes as a script.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let text = std::str::from_utf8(bytes).map_err(|e| FormatError::Encoding {
            offset: e.valid_up_to(),
        })?;
        Self::from_text(text)
    }

    /// Splits text into lines (CRLF, CR or LF) and validates its structure.
    pub fn from_text(text: &str) -> Result<Self, FormatError> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let lines: Vec<String> = text
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .split('\n')
            .map(str::to_string)
            .collect();

        check_braces(&lines)?;
        Ok(Self { lines })
    }

    /// Lines of the script, without terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Verifies that every `{` is closed and no `}` appears unopened.
///
/// Braces inside double-quoted strings and after a `#` comment marker do not
/// count.
fn check_braces(lines: &[String]) -> Result<(), FormatError> {
    let mut open_lines: Vec<usize> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let line_number = index + 1;
        let mut in_quote = false;

        for ch in line.chars() {
            if in_quote {
                if ch == '"' {
                    in_quote = false;
                }
                continue;
            }
            match ch {
                '"' => in_quote = true,
                '#' => break,
                '{' => open_lines.push(line_number),
                '}' => {
                    if open_lines.pop().is_none() {
                        return Err(FormatError::Unbalanced { line: line_number });
                    }
                }
                _ => {}
            }
        }
    }

    match open_lines.last() {
        Some(&line) => Err(FormatError::Unbalanced { line }),
        None => Ok(()),
    }
}
