//! Provides definition for diagnostics, which are normally errors and warnings
//! associated with compilation.

use canopy_problems::Problem;

use crate::core::{FileId, SourceSpan};

/// The position a label refers to. Declarative AST nodes carry a source
/// line number (used for run-time failure annotation) while identifiers
/// carry character offsets, so both forms appear in diagnostics.
#[derive(Debug)]
pub enum Location {
    /// Line in the source file (1-indexed).
    Line(u32),
    /// Byte offsets from the start of the file (0-indexed).
    OffsetRange { start: usize, end: usize },
}

/// A label that refers to some position in a file and is possibly associated
/// with a message related to that position.
///
/// Normally this indicates the location of an error or warning along with a
/// text message describing that position.
#[derive(Debug)]
pub struct Label {
    /// The position of label.
    pub location: Location,

    /// Identifier for the file.
    pub file_id: FileId,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn span(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            location: Location::OffsetRange {
                start: span.start,
                end: span.end,
            },
            file_id: span.file_id,
            message: message.into(),
        }
    }

    pub fn line(line: u32, message: impl Into<String>) -> Self {
        Self {
            location: Location::Line(line),
            file_id: FileId::default(),
            message: message.into(),
        }
    }
}

/// A diagnostic. Diagnostics have a code that is indicative of the category,
/// a primary location and a possibly non-zero set of secondary locations.
#[derive(Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary or first diagnostic.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,

    /// Additional information about the diagnostic.
    pub secondary: Vec<Label>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    ///
    /// The label associates the problem to a particular instance in Canopy
    /// source.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
            secondary: vec![],
        }
    }

    /// Adds to the problem description (primary text) additional context
    /// about the problem.
    ///
    /// This is similar to adding primary and secondary items except that this
    /// forms part of the main description and does not need to be related to
    /// a position in a source file.
    pub fn with_context(mut self, description: &str, item: &str) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    pub fn with_secondary(mut self, label: Label) -> Self {
        self.secondary.push(label);
        self
    }

    /// Returns the description for the diagnostic. This may add in other
    /// data in addition that is part of the diagnostic.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }
}
