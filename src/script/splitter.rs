//! Statement splitting for multi-statement SQL scripts.
//!
//! Splits a raw script into individually executable statements with exact
//! source positions, honoring line comments, block comments, and quoted
//! strings. Positions are 0-based line/character offsets into the original
//! text so a caller can map a statement back to its source span.

use regex::Regex;
use std::sync::OnceLock;

/// One semicolon-delimited unit of SQL text with its source span.
///
/// `start_line`/`start_char` point at the first non-whitespace character of
/// the statement; `end_line`/`end_char` point at the terminating `;` (or the
/// end of the last line for an unterminated final statement), so the span
/// excludes the terminator itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Trimmed statement text, with internal whitespace preserved verbatim.
    pub text: String,
    /// 0-based line of the first non-whitespace character.
    pub start_line: usize,
    /// 0-based line of the terminator (or last line of the script).
    pub end_line: usize,
    /// 0-based character offset of the first non-whitespace character.
    pub start_char: usize,
    /// 0-based character offset of the terminator on `end_line`.
    pub end_char: usize,
}

/// Lexical state of the scan. The states are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    LineComment,
    BlockComment,
    InString(char),
}

fn comment_only_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\s*--.*|\s*/\*.*\*/\s*)$").expect("comment pattern is valid")
    })
}

/// Splits a SQL script into executable statements.
///
/// A single left-to-right scan tracks whether the cursor is inside a line
/// comment, a block comment, or a quoted string; only a `;` seen outside all
/// three closes the current statement. Comment characters are never buffered,
/// so a segment consisting solely of a comment produces no statement. A final
/// segment with no trailing terminator is still emitted if non-empty.
pub fn split_statements(script: &str) -> Vec<Statement> {
    let lines: Vec<Vec<char>> = script.split('\n').map(|l| l.chars().collect()).collect();

    let mut statements = Vec::new();
    let mut buffer = String::new();
    // Recorded lazily at the first non-whitespace character buffered since
    // the last terminator, so blank lines between statements are not
    // attributed to the next statement's span.
    let mut start: Option<(usize, usize)> = None;
    let mut state = ScanState::Normal;

    for (line_index, line) in lines.iter().enumerate() {
        // Line comments never survive a newline.
        if state == ScanState::LineComment {
            state = ScanState::Normal;
        }

        let mut char_index = 0;
        while char_index < line.len() {
            let c = line[char_index];
            let next = line.get(char_index + 1).copied();
            let prev = char_index.checked_sub(1).map(|i| line[i]);
            let mut opened_string = false;

            if state == ScanState::Normal {
                if c == '-' && next == Some('-') {
                    state = ScanState::LineComment;
                    char_index += 2;
                    continue;
                }
                if c == '/' && next == Some('*') {
                    state = ScanState::BlockComment;
                    char_index += 2;
                    continue;
                }
                if c == '\'' || c == '"' {
                    state = ScanState::InString(c);
                    opened_string = true;
                }
            }

            if state == ScanState::BlockComment {
                if c == '*' && next == Some('/') {
                    state = ScanState::Normal;
                    char_index += 2;
                } else {
                    char_index += 1;
                }
                continue;
            }

            if let ScanState::InString(quote) = state {
                // The opening quote itself never closes the string; a quote
                // preceded by a backslash stays inside it.
                if !opened_string && c == quote && prev != Some('\\') {
                    state = ScanState::Normal;
                }
            }

            if state == ScanState::Normal && c == ';' {
                flush_statement(&mut statements, &mut buffer, &mut start, line_index, char_index);
                char_index += 1;
                continue;
            }

            if state != ScanState::LineComment {
                if start.is_none() && !c.is_whitespace() {
                    start = Some((line_index, char_index));
                }
                buffer.push(c);
            }
            char_index += 1;
        }

        // The newline belongs to the statement text unless a block comment
        // swallows it.
        if state != ScanState::BlockComment {
            buffer.push('\n');
        }
    }

    // Trailing statement without a terminator.
    let last_line = lines.len().saturating_sub(1);
    let last_len = lines.last().map(Vec::len).unwrap_or(0);
    flush_statement(&mut statements, &mut buffer, &mut start, last_line, last_len);

    statements
}

/// Emits the buffered statement if it has content, then resets the buffer.
fn flush_statement(
    statements: &mut Vec<Statement>,
    buffer: &mut String,
    start: &mut Option<(usize, usize)>,
    end_line: usize,
    end_char: usize,
) {
    let text = buffer.trim();
    if let Some((start_line, start_char)) = *start {
        if !text.is_empty() && !comment_only_pattern().is_match(text) {
            statements.push(Statement {
                text: text.to_string(),
                start_line,
                end_line,
                start_char,
                end_char,
            });
        }
    }
    buffer.clear();
    *start = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(script: &str) -> Vec<String> {
        split_statements(script).into_iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_single_statement_with_terminator() {
        let statements = split_statements("SELECT 1;");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT 1");
        assert_eq!(statements[0].start_line, 0);
        assert_eq!(statements[0].start_char, 0);
        assert_eq!(statements[0].end_line, 0);
        assert_eq!(statements[0].end_char, 8);
    }

    #[test]
    fn test_final_statement_without_terminator() {
        let statements = split_statements("SELECT 1");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT 1");
        assert_eq!(statements[0].end_char, 8);
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(
            texts("SELECT 1; SELECT 2; SELECT 3"),
            vec!["SELECT 1", "SELECT 2", "SELECT 3"]
        );
    }

    #[test]
    fn test_semicolon_in_single_quoted_string() {
        assert_eq!(texts("SELECT 'a;b' AS x; SELECT 2"), vec!["SELECT 'a;b' AS x", "SELECT 2"]);
    }

    #[test]
    fn test_semicolon_in_double_quoted_string() {
        assert_eq!(texts(r#"SELECT "a;b"; SELECT 2"#), vec![r#"SELECT "a;b""#, "SELECT 2"]);
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        assert_eq!(texts(r"SELECT 'it\'s; fine' AS x"), vec![r"SELECT 'it\'s; fine' AS x"]);
    }

    #[test]
    fn test_semicolon_in_line_comment() {
        assert_eq!(texts("SELECT 1 -- not a terminator ;\n, 2"), vec!["SELECT 1 \n, 2"]);
    }

    #[test]
    fn test_semicolon_in_block_comment() {
        assert_eq!(texts("SELECT 1 /* ; */ AS x;"), vec!["SELECT 1  AS x"]);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        assert_eq!(texts("SELECT 1 /* first;\nsecond; */ AS x;"), vec!["SELECT 1  AS x"]);
    }

    #[test]
    fn test_comment_only_segment_is_dropped() {
        assert_eq!(texts("-- just a comment\n"), Vec::<String>::new());
        assert_eq!(texts("/* block */"), Vec::<String>::new());
        assert_eq!(texts("-- one\n-- two;\n"), Vec::<String>::new());
    }

    #[test]
    fn test_empty_segments_are_dropped() {
        assert_eq!(texts(";;;"), Vec::<String>::new());
        assert_eq!(texts("  ;  \n ; "), Vec::<String>::new());
        assert_eq!(texts(""), Vec::<String>::new());
    }

    #[test]
    fn test_multiline_statement_preserves_indentation() {
        let statements = split_statements("SELECT a,\n       b\nFROM t;");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT a,\n       b\nFROM t");
        assert_eq!(statements[0].start_line, 0);
        assert_eq!(statements[0].end_line, 2);
        assert_eq!(statements[0].end_char, 6);
    }

    #[test]
    fn test_leading_whitespace_not_in_span() {
        let statements = split_statements("   SELECT 1;");
        assert_eq!(statements[0].start_char, 3);
        assert_eq!(statements[0].text, "SELECT 1");
    }

    #[test]
    fn test_blank_lines_between_statements_not_attributed() {
        let statements = split_statements("SELECT 1;\n\n\nSELECT 2;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].start_line, 3);
        assert_eq!(statements[1].start_char, 0);
    }

    #[test]
    fn test_header_comment_scenario() {
        // Script with a leading comment, a terminated statement, and an
        // unterminated trailing statement with a trailing comment.
        let script = "-- header\nSELECT 1 as a;\nSELECT 2 as b -- trailing";
        let statements = split_statements(script);
        assert_eq!(statements.len(), 2);

        assert_eq!(statements[0].text, "SELECT 1 as a");
        assert_eq!(statements[0].start_line, 1);
        assert_eq!(statements[0].end_line, 1);
        assert_eq!(statements[0].end_char, 13);

        assert_eq!(statements[1].text, "SELECT 2 as b");
        assert_eq!(statements[1].start_line, 2);
        assert_eq!(statements[1].end_line, 2);
        assert_eq!(statements[1].end_char, 25);
    }

    #[test]
    fn test_statement_count_matches_top_level_terminators() {
        // Three top-level semicolons plus trailing text: four statements.
        let script = "CREATE TABLE t (x INT);\nINSERT INTO t VALUES (1);\nSELECT ';' FROM t;\nSELECT 2";
        assert_eq!(split_statements(script).len(), 4);
    }

    #[test]
    fn test_comment_between_statements() {
        let statements = split_statements("SELECT 1;\n-- between\nSELECT 2;");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[1].text, "SELECT 2");
        assert_eq!(statements[1].start_line, 2);
    }

    #[test]
    fn test_line_comment_resets_at_newline() {
        // The comment swallows the rest of its line only.
        let statements = split_statements("-- c\nSELECT 1;");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].start_line, 1);
    }

    #[test]
    fn test_unterminated_string_swallows_terminator() {
        // An unclosed quote runs to end of input; the `;` inside never splits.
        let statements = split_statements("SELECT 'oops; SELECT 2");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].text, "SELECT 'oops; SELECT 2");
    }

    #[test]
    fn test_quote_inside_double_quoted_identifier() {
        assert_eq!(
            texts(r#"SELECT "col'name" FROM t; SELECT 2"#),
            vec![r#"SELECT "col'name" FROM t"#, "SELECT 2"]
        );
    }

    #[test]
    fn test_statement_spans_map_back_to_source() {
        let script = "SELECT 1;\n  UPDATE t SET x = 2;";
        let statements = split_statements(script);
        let lines: Vec<&str> = script.split('\n').collect();

        for statement in &statements {
            // Single-line spans: the substring between start_char and
            // end_char must reproduce the statement text.
            assert_eq!(statement.start_line, statement.end_line);
            let line = lines[statement.start_line];
            let span: String = line
                .chars()
                .skip(statement.start_char)
                .take(statement.end_char - statement.start_char)
                .collect();
            assert_eq!(span, statement.text);
        }
    }
}
