//! Line-driven association of doc comments with the declarations they precede.
//!
//! The machine is a pure fold: [`step`] takes the current [`ScanState`] and one
//! line and returns the next state plus, when a declaration has just been
//! closed, the finished [`PairedRecord`]. [`Scanner`] keeps that state for one
//! source unit. Nothing is shared between units, so units can be scanned on
//! separate threads.

use crate::classify::{
    closes_block_doc, closes_on_same_line, contains_statement_terminator, has_unenclosed_brace,
    opens_block_doc, opens_line_doc,
};
use crate::record::PairedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocStyle {
    /// `/** ... */`, closed by a line starting with `*/`.
    Block,
    /// Consecutive `///` lines, closed by the first line without the marker.
    Line,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    InDocBlock {
        style: DocStyle,
        doc: Vec<String>,
    },
    InSignature {
        doc: Vec<String>,
        signature: String,
    },
}

pub fn step(state: ScanState, line: &str, origin: &str) -> (ScanState, Option<PairedRecord>) {
    match state {
        ScanState::Idle => (open_doc(line), None),
        ScanState::InDocBlock {
            style: DocStyle::Block,
            mut doc,
        } => {
            doc.push(line.to_string());
            let next = if closes_block_doc(line) {
                ScanState::InSignature {
                    doc,
                    signature: String::new(),
                }
            } else {
                ScanState::InDocBlock {
                    style: DocStyle::Block,
                    doc,
                }
            };
            (next, None)
        }
        ScanState::InDocBlock {
            style: DocStyle::Line,
            mut doc,
        } => {
            if opens_line_doc(line) {
                doc.push(line.to_string());
                return (
                    ScanState::InDocBlock {
                        style: DocStyle::Line,
                        doc,
                    },
                    None,
                );
            }
            // The first unmarked line already belongs to the declaration.
            extend_signature(doc, String::new(), line, origin)
        }
        ScanState::InSignature { doc, signature } => extend_signature(doc, signature, line, origin),
    }
}

/// True once `signature` holds a `;` anywhere or a `{` outside parentheses.
///
/// A `;` inside a string literal ends the signature early. Callers rely on
/// that behaviour, so it is kept.
pub fn signature_complete(signature: &str) -> bool {
    contains_statement_terminator(signature) || has_unenclosed_brace(signature)
}

fn open_doc(line: &str) -> ScanState {
    if closes_on_same_line(line) {
        ScanState::InSignature {
            doc: vec![line.to_string()],
            signature: String::new(),
        }
    } else if opens_block_doc(line) {
        ScanState::InDocBlock {
            style: DocStyle::Block,
            doc: vec![line.to_string()],
        }
    } else if opens_line_doc(line) {
        ScanState::InDocBlock {
            style: DocStyle::Line,
            doc: vec![line.to_string()],
        }
    } else {
        ScanState::Idle
    }
}

fn extend_signature(
    doc: Vec<String>,
    mut signature: String,
    line: &str,
    origin: &str,
) -> (ScanState, Option<PairedRecord>) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return (ScanState::InSignature { doc, signature }, None);
    }

    if !signature.is_empty() {
        signature.push(' ');
    }
    signature.push_str(trimmed);

    if !signature_complete(&signature) {
        return (ScanState::InSignature { doc, signature }, None);
    }

    let record = PairedRecord::new(origin, &doc.join("\n"), &signature);
    (ScanState::Idle, record)
}

/// Scanner state for a single source unit.
#[derive(Debug)]
pub struct Scanner<'a> {
    origin: &'a str,
    state: ScanState,
}

impl<'a> Scanner<'a> {
    pub fn new(origin: &'a str) -> Self {
        Self {
            origin,
            state: ScanState::Idle,
        }
    }

    pub fn push(&mut self, line: &str) -> Option<PairedRecord> {
        let state = std::mem::take(&mut self.state);
        let (next, record) = step(state, line, self.origin);
        self.state = next;
        record
    }

    /// Whether a doc comment or signature is still open. Whatever is open when
    /// the unit runs out of lines is dropped.
    pub fn is_pending(&self) -> bool {
        self.state != ScanState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Vec<PairedRecord> {
        let mut scanner = Scanner::new("TestClass");
        source.lines().filter_map(|l| scanner.push(l)).collect()
    }

    #[test]
    fn single_line_block_doc() {
        let records = scan("/** d */\npublic void m() {}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin(), "TestClass");
        assert_eq!(records[0].documentation(), "/** d */");
        assert_eq!(records[0].signature(), "public void m() {}");
    }

    #[test]
    fn empty_block_doc_pairs_like_any_single_line_doc() {
        let records = scan("/**/\npublic void m() {}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].documentation(), "/**/");
        assert_eq!(records[0].signature(), "public void m() {}");
    }

    #[test]
    fn multi_line_block_doc_keeps_continuation_lines() {
        let source = "/**\n * This is a multiline\n * documentation block\n */\npublic void multilineMethod() {}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].documentation(),
            "/**\n * This is a multiline\n * documentation block\n */"
        );
        assert_eq!(records[0].signature(), "public void multilineMethod() {}");
    }

    #[test]
    fn blank_lines_after_doc_are_tolerated() {
        let source = "/**\n * Documentation with\n * blank lines after\n */\n\n\npublic void spacedMethod() {}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].signature(), "public void spacedMethod() {}");
        assert_eq!(
            records[0].documentation(),
            "/**\n * Documentation with\n * blank lines after\n */"
        );
    }

    #[test]
    fn source_without_doc_comments_yields_nothing() {
        let source = "public class NoDoc {\n    public void a() {}\n    /* plain */\n    // line\n    public void b() {}\n}\n";
        assert!(scan(source).is_empty());
        assert!(scan("").is_empty());
    }

    #[test]
    fn plain_comments_are_ignored_next_to_doc_comments() {
        let source = "// Regular comment\npublic void ignored1() {}\n\n/* Block comment */\npublic void ignored2() {}\n\n/** Real doc */\npublic void documented() {}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].documentation(), "/** Real doc */");
        assert_eq!(records[0].signature(), "public void documented() {}");
    }

    #[test]
    fn multiple_pairs_stay_in_source_order() {
        let source = "/** First */\npublic void first() {}\n\n/** Second */\npublic void second() {}\n\n/**\n * Third\n */\npublic void third() {}\n";
        let signatures: Vec<_> = scan(source)
            .iter()
            .map(|r| r.signature().to_string())
            .collect();
        assert_eq!(
            signatures,
            vec![
                "public void first() {}",
                "public void second() {}",
                "public void third() {}",
            ]
        );
    }

    #[test]
    fn annotation_array_brace_does_not_end_signature() {
        let source = r#"/** Does it. */
@SuppressWarnings({
    "unused",
    "unchecked"
}
)
public void m(@Value("x") String s) {
    return;
}
"#;
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].normalized_signature(),
            r#"@SuppressWarnings({ "unused", "unchecked" } ) public void m(@Value("x") String s) {"#
        );
    }

    #[test]
    fn annotated_field_ends_at_semicolon() {
        let records = scan("/** A field. */\n@Deprecated String field;\nint other;\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].signature(), "@Deprecated String field;");
    }

    #[test]
    fn line_doc_block_hands_first_unmarked_line_to_signature() {
        let source = "/// This is a multiline\n/// documentation block\n/// with several lines\npublic void multilineMethod() {}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].documentation(),
            "/// This is a multiline\n/// documentation block\n/// with several lines"
        );
        assert_eq!(records[0].signature(), "public void multilineMethod() {}");
    }

    #[test]
    fn line_doc_then_blank_lines() {
        let source = "\n/// Documentation with\n/// blank lines after\n\n\npublic void spacedMethod() {}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].documentation(),
            "/// Documentation with\n/// blank lines after"
        );
        assert_eq!(records[0].signature(), "public void spacedMethod() {}");
    }

    #[test]
    fn line_doc_single_line_declaration_emits_immediately() {
        let mut scanner = Scanner::new("A.java");
        assert!(scanner.push("/// count").is_none());
        let record = scanner.push("int count;").unwrap();
        assert_eq!(record.signature(), "int count;");
        assert!(!scanner.is_pending());
    }

    #[test]
    fn complex_markdown_doc_comments() {
        let source = r#"/// This is a test case of what complex looks like!
@SuppressWarnings(value = {
    "one",
    "two"
}
)
@Deprecated(since
    = "Use something else")
public
static
class AnnotatedClass<T>
    implements Function<
    T,
    List<String
        >
    > {

  /// This is a field

  @SuppressWarnings({
      "unused",
      "unchecked"
  }
  )
  String field;


  @Override
  public List<String> apply(T t) {
    return List.of();
  }

  ///
  /// This is a method
  ///
  @SuppressWarnings({
      "unused",
      "unchecked"
  }
  )
  public
  static <T
      , R>
  List<R> doIt
  (T t) {
    // stuff
    return List.of();
  }
}
"#;
        let records = scan(source);
        assert_eq!(records.len(), 3);

        assert_eq!(
            records[0].documentation(),
            "/// This is a test case of what complex looks like!"
        );
        assert_eq!(
            records[0].normalized_signature(),
            r#"@SuppressWarnings(value = { "one", "two" } ) @Deprecated(since = "Use something else") public static class AnnotatedClass<T> implements Function< T, List<String > > {"#
        );

        assert_eq!(records[1].documentation(), "/// This is a field");
        assert_eq!(
            records[1].normalized_signature(),
            r#"@SuppressWarnings({ "unused", "unchecked" } ) String field;"#
        );

        assert_eq!(
            records[2].documentation(),
            "///\n  /// This is a method\n  ///"
        );
        assert_eq!(
            records[2].normalized_signature(),
            "@SuppressWarnings({ \"unused\", \"unchecked\" } ) public static <T , R> List<R> doIt (T t) {"
        );
    }

    #[test]
    fn package_info_needs_no_special_case() {
        let source = "/**\n * This is a package info\n */\npackage io.github.example;\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].documentation(),
            "/**\n * This is a package info\n */"
        );
        assert_eq!(records[0].signature(), "package io.github.example;");
    }

    #[test]
    fn interface_prototype_ends_at_semicolon() {
        let source = "interface Shape {\n    /**\n     * Area.\n     */\n    double area(\n        Unit unit);\n}\n";
        let records = scan(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].signature(), "double area( Unit unit);");
    }

    #[test]
    fn unfinished_unit_emits_no_partial_record() {
        let mut scanner = Scanner::new("A.java");
        assert!(scanner.push("/**").is_none());
        assert!(scanner.push(" * never closed").is_none());
        assert!(scanner.is_pending());

        let mut scanner = Scanner::new("A.java");
        assert!(scanner.push("/** d */").is_none());
        assert!(scanner.push("public void m(").is_none());
        assert!(scanner.push("    int a").is_none());
        assert!(scanner.is_pending());
    }

    #[test]
    fn semicolon_in_annotation_string_ends_signature_early() {
        let records = scan("/** d */\n@Query(\"select 1;\")\npublic void q() {\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].signature(), "@Query(\"select 1;\")");
    }

    #[test]
    fn step_is_a_pure_fold() {
        let lines = ["/** d */", "", "void m() {", "}"];
        let run = || {
            let mut state = ScanState::Idle;
            let mut out = Vec::new();
            for line in lines {
                let (next, record) = step(state, line, "A.java");
                state = next;
                out.extend(record);
            }
            (state, out)
        };
        assert_eq!(run(), run());
        assert_eq!(run().0, ScanState::Idle);
        assert_eq!(run().1.len(), 1);
    }

    #[test]
    fn signature_complete_checks_both_paths() {
        assert!(signature_complete("package a.b;"));
        assert!(signature_complete("class A {"));
        assert!(!signature_complete("@Target({ElementType.TYPE})"));
        assert!(!signature_complete("public void m(int a,"));
    }
}
