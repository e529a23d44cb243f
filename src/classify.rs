//! Stateless per-line predicates used by the association state machine.
//!
//! Every predicate looks at the line with surrounding whitespace stripped.
//! String and character literals are not tokenized: a brace or paren inside a
//! literal counts like any other.

const BLOCK_DOC_OPEN: &str = "/**";
const BLOCK_DOC_CLOSE: &str = "*/";
const LINE_DOC_MARKER: &str = "///";

/// `/**` opens a doc comment, a plain `/*` does not.
pub fn opens_block_doc(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(BLOCK_DOC_OPEN)
}

/// A `/**` line that also carries its `*/`, e.g. `/** Returns the size. */`.
pub fn closes_on_same_line(line: &str) -> bool {
    let trimmed = line.trim();
    opens_block_doc(trimmed) && trimmed.contains(BLOCK_DOC_CLOSE)
}

pub fn closes_block_doc(line: &str) -> bool {
    line.trim().starts_with(BLOCK_DOC_CLOSE)
}

pub fn opens_line_doc(line: &str) -> bool {
    line.trim().starts_with(LINE_DOC_MARKER)
}

pub fn contains_statement_terminator(text: &str) -> bool {
    text.contains(';')
}

/// Whether `text` holds a `{` outside of any parenthesized group.
///
/// Braces inside annotation arguments such as `@SuppressWarnings({"a", "b"})`
/// sit at paren depth one and are skipped; the first brace at depth zero is
/// the one that opens the declaration body.
pub fn has_unenclosed_brace(text: &str) -> bool {
    let mut depth = 0usize;
    for ch in text.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => return true,
            _ => {}
        }
    }
    false
}
