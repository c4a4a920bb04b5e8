//! `static_galaxy_scenario` text codec.
//!
//! Loading happens in two stages. [`SourceText`] reads and structurally
//! validates the script, then the parse passes turn its lines into a
//! [`ParsedScenario`]. The live [`Scenario`](crate::scenario::Scenario) is
//! only touched once both stages have succeeded.
//!
//! The script's x axis points the other way from the editor's, so x
//! coordinates are negated in both directions.

mod parser;
mod serializer;
mod source;

pub use serializer::serialize;
pub use source::SourceText;

use crate::error::FormatError;
use crate::scenario::{Annotation, Settings, System};
use crate::types::SystemId;

/// Line terminator used on output.
pub const LINE_ENDING: &str = "\r\n";

/// Records extracted from a script, not yet validated against each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScenario {
    pub settings: Settings,
    pub systems: Vec<System>,
    pub lanes: Vec<(SystemId, SystemId)>,
    pub annotations: Vec<Annotation>,
}

/// Validates and parses a whole script held in memory.
pub fn parse_str(text: &str) -> Result<ParsedScenario, FormatError> {
    Ok(SourceText::from_text(text)?.parse())
}

/// Parses a script from raw bytes, rejecting anything that is not UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> Result<ParsedScenario, FormatError> {
    Ok(SourceText::from_bytes(bytes)?.parse())
}

/// Converts an x coordinate between script and editor orientation.
pub(crate) fn mirror_axis(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        -value
    }
}
