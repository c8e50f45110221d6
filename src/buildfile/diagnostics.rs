//! Errors raised while reading a build file, with source spans for `miette`.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Ways a single line can break the build-file grammar.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MalformedKind {
    /// A tab-indented command appeared before any target line.
    #[error("command appears before any target")]
    CommandBeforeTarget,
    /// A target line has no colon.
    #[error("target line must contain a name followed by a colon")]
    MissingColon,
    /// A target line has more than one colon.
    #[error("target line must contain exactly one colon")]
    ExtraColon,
    /// Nothing but whitespace precedes the colon.
    #[error("target name is empty")]
    EmptyName,
    /// The target name contains whitespace.
    #[error("target name `{name}` must be a single word")]
    InvalidName {
        /// Text found before the colon, trimmed.
        name: String,
    },
}

impl MalformedKind {
    fn help(&self) -> Option<String> {
        match self {
            Self::CommandBeforeTarget => {
                Some("start the file with a target line such as `all: main.o`".to_owned())
            }
            Self::MissingColon => Some(
                "command lines must start with a tab; other lines declare targets".to_owned(),
            ),
            Self::ExtraColon | Self::EmptyName | Self::InvalidName { .. } => None,
        }
    }
}

/// Errors raised while parsing a build file.
///
/// # Examples
///
/// ```
/// use tsumiki::buildfile::{self, BuildFileError};
///
/// let err = buildfile::from_str("\n\n").expect_err("no targets");
/// assert!(matches!(err, BuildFileError::EmptyFile { .. }));
/// ```
#[derive(Debug, Error, Diagnostic)]
pub enum BuildFileError {
    /// The file contains no target lines.
    #[error("{name} declares no targets")]
    #[diagnostic(
        code(tsumiki::buildfile::empty),
        help("add a target line such as `all: main.o`")
    )]
    EmptyFile {
        /// Display name of the build file.
        name: String,
    },

    /// A line does not follow the build-file grammar.
    #[error("line {line}: {kind}")]
    #[diagnostic(code(tsumiki::buildfile::malformed))]
    MalformedFile {
        /// What is wrong with the line.
        kind: MalformedKind,
        /// One-based line number.
        line: usize,
        /// File contents.
        #[source_code]
        src: NamedSource<String>,
        /// Offending text.
        #[label("here")]
        span: SourceSpan,
        /// Suggested fix.
        #[help]
        help: Option<String>,
    },

    /// A target name appears on the left of two target lines.
    #[error("line {line}: `{name}` is already a target")]
    #[diagnostic(code(tsumiki::buildfile::duplicate_target))]
    DuplicateTarget {
        /// Target declared twice.
        name: String,
        /// One-based line number of the second declaration.
        line: usize,
        /// File contents.
        #[source_code]
        src: NamedSource<String>,
        /// Second declaration.
        #[label("declared again here")]
        span: SourceSpan,
        /// First declaration.
        #[label("first declared here")]
        first: SourceSpan,
    },

    /// A target lists the same dependency twice.
    #[error("line {line}: `{target}` already has dependency `{dependency}`")]
    #[diagnostic(code(tsumiki::buildfile::duplicate_dependency))]
    DuplicateDependency {
        /// Target with the repeated dependency.
        target: String,
        /// Repeated dependency.
        dependency: String,
        /// One-based line number.
        line: usize,
        /// File contents.
        #[source_code]
        src: NamedSource<String>,
        /// Repeated occurrence.
        #[label("repeated dependency")]
        span: SourceSpan,
    },
}

impl BuildFileError {
    pub(super) fn malformed(
        kind: MalformedKind,
        line: usize,
        src: NamedSource<String>,
        span: SourceSpan,
    ) -> Self {
        let help = kind.help();
        Self::MalformedFile {
            kind,
            line,
            src,
            span,
            help,
        }
    }

    /// One-based line number of the offending line, if the error has one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::EmptyFile { .. } => None,
            Self::MalformedFile { line, .. }
            | Self::DuplicateTarget { line, .. }
            | Self::DuplicateDependency { line, .. } => Some(*line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn malformed_message_includes_line_and_reason() {
        let err = BuildFileError::malformed(
            MalformedKind::MissingColon,
            3,
            NamedSource::new("Tsumikifile", "a:\n\nbad\n".to_owned()),
            SourceSpan::from((4, 3)),
        );
        assert_eq!(
            err.to_string(),
            "line 3: target line must contain a name followed by a colon"
        );
        assert!(err.help().is_some());
        assert_eq!(err.line(), Some(3));
    }

    #[rstest]
    fn duplicate_target_labels_both_declarations() {
        let err = BuildFileError::DuplicateTarget {
            name: "a".into(),
            line: 2,
            src: NamedSource::new("Tsumikifile", "a:\na:\n".to_owned()),
            span: SourceSpan::from((3, 1)),
            first: SourceSpan::from((0, 1)),
        };
        let labels: Vec<_> = err.labels().expect("labels").collect();
        assert_eq!(labels.len(), 2);
    }
}
