//! Line classification for build files.

use miette::SourceSpan;

use super::MalformedKind;

/// One physical line without its terminator.
#[derive(Clone, Copy, Debug)]
pub(super) struct SourceLine<'a> {
    /// One-based line number.
    pub(super) number: usize,
    /// Byte offset of the line within the file.
    pub(super) offset: usize,
    /// Line text with `\n` or `\r\n` removed.
    pub(super) content: &'a str,
}

impl SourceLine<'_> {
    pub(super) fn span(&self) -> SourceSpan {
        SourceSpan::from((self.offset, self.content.len()))
    }

    pub(super) fn span_at(&self, start: usize, len: usize) -> SourceSpan {
        SourceSpan::from((self.offset + start, len))
    }
}

/// Split `text` into lines, tracking byte offsets for diagnostics.
pub(super) fn lines(text: &str) -> impl Iterator<Item = SourceLine<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .enumerate()
        .map(move |(idx, segment)| {
            let start = offset;
            offset += segment.len();
            let content = segment.strip_suffix('\n').unwrap_or(segment);
            let content = content.strip_suffix('\r').unwrap_or(content);
            SourceLine {
                number: idx + 1,
                offset: start,
                content,
            }
        })
}

/// What a line contributes to the graph.
#[derive(Debug, Eq, PartialEq)]
pub(super) enum LineKind<'a> {
    /// Only whitespace.
    Blank,
    /// Tab-indented command, trimmed; `None` when nothing but whitespace
    /// follows the tab.
    Command(Option<&'a str>),
    /// Anything else.
    Target,
}

pub(super) fn classify(content: &str) -> LineKind<'_> {
    if content.trim().is_empty() {
        LineKind::Blank
    } else if let Some(rest) = content.strip_prefix('\t') {
        let command = rest.trim();
        LineKind::Command((!command.is_empty()).then_some(command))
    } else {
        LineKind::Target
    }
}

/// A word together with its byte offset inside the line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct Token<'a> {
    pub(super) offset: usize,
    pub(super) text: &'a str,
}

/// Parsed `<name>: <dep>*` line.
#[derive(Debug, Eq, PartialEq)]
pub(super) struct TargetLine<'a> {
    pub(super) name: Token<'a>,
    pub(super) dependencies: Vec<Token<'a>>,
}

/// Error location within a line: offset and length.
pub(super) type Malformed = (MalformedKind, usize, usize);

pub(super) fn parse_target_line(content: &str) -> Result<TargetLine<'_>, Malformed> {
    let Some(colon) = content.find(':') else {
        return Err((MalformedKind::MissingColon, 0, content.len()));
    };
    let head = content.get(..colon).unwrap_or_default();
    let tail_start = colon + 1;
    let tail = content.get(tail_start..).unwrap_or_default();
    if let Some(extra) = tail.find(':') {
        return Err((MalformedKind::ExtraColon, tail_start + extra, 1));
    }

    let mut names = words(head);
    let name = match (names.next(), names.next()) {
        (None, _) => return Err((MalformedKind::EmptyName, colon, 1)),
        (Some(name), None) => name,
        (Some(first), Some(_)) => {
            let name = head.trim();
            return Err((
                MalformedKind::InvalidName {
                    name: name.to_owned(),
                },
                first.offset,
                name.len(),
            ));
        }
    };

    let dependencies = words(tail)
        .map(|token| Token {
            offset: tail_start + token.offset,
            text: token.text,
        })
        .collect();
    Ok(TargetLine { name, dependencies })
}

/// Whitespace-separated words of `text` with their offsets.
pub(super) fn words(text: &str) -> impl Iterator<Item = Token<'_>> {
    let mut start: Option<usize> = None;
    let mut found = Vec::new();
    for (idx, ch) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
        match (ch.is_whitespace(), start) {
            (true, Some(begin)) => {
                if let Some(word) = text.get(begin..idx) {
                    found.push(Token {
                        offset: begin,
                        text: word,
                    });
                }
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    found.into_iter()
}
