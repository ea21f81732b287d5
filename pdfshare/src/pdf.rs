//! PDF text extraction.
//!
//! Wraps `lopdf` to pull plain text out of a document page by page. Every
//! text-showing operator (`Tj`, `TJ`, `'`, `"`) yields one run; within a page,
//! runs are joined with single spaces and pages are joined with a blank line.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use tracing::{debug, instrument};

use crate::errors::{Error, Result};

/// Separator placed between the text of consecutive pages.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Extract the text of every page, in page order (1..=N).
#[instrument(skip_all, fields(size_bytes = bytes.len()), err(level = "debug"))]
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    let mut document = Document::load_mem(bytes).map_err(parse_error)?;

    let pages = document.get_pages();
    debug!(page_count = pages.len(), "Loaded PDF document");

    pages
        .into_iter()
        .map(|(page_number, page_id)| {
            // lopdf ends a run only at ET, so give every shown string its own text object
            let content = document.get_and_decode_page_content(page_id).map_err(parse_error)?;
            let content = isolate_text_runs(content);
            document
                .change_page_content(page_id, content.encode().map_err(parse_error)?)
                .map_err(parse_error)?;

            let raw = document.extract_text(&[page_number]).map_err(parse_error)?;
            Ok(join_tokens(&raw))
        })
        .collect()
}

fn parse_error(e: lopdf::Error) -> Error {
    Error::Parse { message: e.to_string() }
}

/// Close the current text object after every text-showing operator and open a new one.
///
/// `'` and `"` are rewritten as `T*` followed by `Tj`, since lopdf only reads `Tj` and `TJ`.
/// Fonts and text state live in the graphics state and survive the split.
fn isolate_text_runs(content: Content) -> Content {
    let mut operations = Vec::with_capacity(content.operations.len() * 2);

    for operation in content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" => operations.push(operation),
            "'" | "\"" => {
                // `"` takes (aw ac string); the string is always last
                let shown = operation.operands.into_iter().last().filter(|o| matches!(o, Object::String(..)));
                operations.push(Operation::new("T*", vec![]));
                operations.push(Operation::new("Tj", shown.into_iter().collect()));
            }
            _ => {
                operations.push(operation);
                continue;
            }
        }
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("BT", vec![]));
    }

    Content { operations }
}

/// Extract the whole document as one string, pages separated by a blank line.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    Ok(extract_pages(bytes)?.join(PAGE_SEPARATOR))
}

/// Collapse the text runs of one page into a single space-separated line.
fn join_tokens(raw: &str) -> String {
    raw.lines().map(str::trim).filter(|token| !token.is_empty()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{pdf_from_operations, sample_pdf};

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    #[test]
    fn test_join_tokens() {
        assert_eq!(join_tokens("Hello\nworld\n"), "Hello world");
        assert_eq!(join_tokens("  padded  \n\n\nrun \n"), "padded run");
        assert_eq!(join_tokens(""), "");
    }

    #[test]
    fn test_single_page() {
        let pdf = sample_pdf(&[&["Hello", "world"]]);
        assert_eq!(extract_pages(&pdf).unwrap(), vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_pages_in_order_separated_by_blank_line() {
        let pdf = sample_pdf(&[&["first"], &["second", "page"], &["third"]]);

        let text = extract_text(&pdf).unwrap();
        let blocks: Vec<&str> = text.split(PAGE_SEPARATOR).collect();

        assert_eq!(blocks, vec!["first", "second page", "third"]);
    }

    #[test]
    fn test_several_runs_in_one_text_object() {
        // BT /F1 12 Tf 72 720 Td (Hello) Tj 0 -20 Td (world) Tj ET
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![72.into(), 720.into()]),
            op("Tj", vec![Object::string_literal("Hello")]),
            op("Td", vec![0.into(), (-20).into()]),
            op("Tj", vec![Object::string_literal("world")]),
            op("ET", vec![]),
        ]]);

        assert_eq!(extract_pages(&pdf).unwrap(), vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_array_and_quote_operators_are_runs() {
        let pdf = pdf_from_operations(vec![vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("TL", vec![14.into()]),
            op("Td", vec![72.into(), 720.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("Quar"),
                    (-20).into(),
                    Object::string_literal("terly"),
                ])],
            ),
            op("'", vec![Object::string_literal("report")]),
            op("\"", vec![1.into(), 0.into(), Object::string_literal("2024")]),
            op("ET", vec![]),
        ]]);

        assert_eq!(extract_pages(&pdf).unwrap(), vec!["Quarterly report 2024".to_string()]);
    }

    #[test]
    fn test_invalid_bytes_are_parse_errors() {
        let err = extract_pages(b"definitely not a pdf").unwrap_err();
        match err {
            Error::Parse { message } => assert!(!message.is_empty()),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(extract_pages(b"").unwrap_err(), Error::Parse { .. }));
    }
}
