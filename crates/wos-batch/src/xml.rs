//! XML post-processing for WOS result pages.
//!
//! Pages arrive as one `<records>` document per request. These helpers strip the
//! default namespace, pretty-print, pull field text with a simple path selector,
//! cut out individual `<REC>` elements and merge pages back into one document.

use std::sync::LazyLock;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use regex::Regex;

use crate::error::XmlError;
use crate::models::Record;

/// XML declaration written at the top of generated documents.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" ?>"#;

/// Element name of a single full record.
pub const RECORD_TAG: &str = "REC";

/// Element name of a record's WOS identifier.
pub const UID_TAG: &str = "UID";

static DEFAULT_NAMESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#" xmlns="[^"]+""#).expect("valid namespace regex"));

static RECORDS_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^.*?<records(?:\s[^>]*)?>").expect("valid records-open regex")
});

static RECORDS_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</records>.*$").expect("valid records-close regex"));

/// Remove the first default namespace declaration so element names match unprefixed.
#[must_use]
pub fn strip_default_namespace(xml: &str) -> String {
    DEFAULT_NAMESPACE.replacen(xml, 1, "").into_owned()
}

/// Characters XML 1.0 forbids even when escaped.
const fn is_illegal_xml_char(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
}

/// Locate the first character that XML 1.0 does not allow.
#[must_use]
pub fn find_illegal_char(xml: &str) -> Option<(usize, char)> {
    xml.char_indices().find(|&(_, c)| is_illegal_xml_char(c))
}

/// Re-indent a document, one tab per level, under a fresh declaration.
///
/// # Errors
///
/// Fails on illegal characters, mismatched or unclosed tags.
pub fn pretty_print(xml: &str) -> Result<String, XmlError> {
    if let Some((position, c)) = find_illegal_char(xml) {
        return Err(XmlError::IllegalChar { code: u32::from(c), position });
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Decl(_) => {}
            Event::Start(e) => {
                open.push(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                open.pop();
                writer.write_event(Event::End(e))?;
            }
            event => writer.write_event(event)?,
        }
    }

    if let Some(name) = open.pop() {
        return Err(XmlError::Unclosed(name));
    }

    let body = String::from_utf8(writer.into_inner())?;
    Ok(format!("{XML_DECLARATION}\n{body}\n"))
}

/// Split a selector such as `./REC/UID` into element names below the root.
fn selector_path(selector: &str) -> Vec<&str> {
    selector
        .trim_start_matches("./")
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Text of every element matching `selector`, in document order.
///
/// The selector is a `/`-separated path of element names relative to the
/// document root (`./REC/UID`). Only the element's own text is returned.
///
/// # Errors
///
/// Fails on malformed markup.
pub fn select(xml: &str, selector: &str) -> Result<Vec<String>, XmlError> {
    let path = selector_path(selector);
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut capture: Option<String> = None;
    let mut found = Vec::new();

    let on_path = |stack: &[String]| {
        stack.len() == path.len() + 1
            && stack[1..].iter().zip(&path).all(|(a, b)| a.as_str() == *b)
    };

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if capture.is_none() && on_path(stack.as_slice()) {
                    capture = Some(String::new());
                }
            }
            Event::Empty(e) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if capture.is_none() && on_path(stack.as_slice()) {
                    found.push(String::new());
                }
                stack.pop();
            }
            Event::Text(t) => {
                if let Some(text) = capture.as_mut() {
                    if stack.len() == path.len() + 1 {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::CData(c) => {
                if let Some(text) = capture.as_mut() {
                    if stack.len() == path.len() + 1 {
                        text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
            }
            Event::End(_) => {
                if stack.len() == path.len() + 1 {
                    if let Some(text) = capture.take() {
                        found.push(text);
                    }
                }
                stack.pop();
            }
            _ => {}
        }
    }

    Ok(found)
}

/// Cut every `<REC>` child of the root out of a page, keeping its raw markup.
///
/// # Errors
///
/// Fails on malformed markup.
pub fn split_records(xml: &str) -> Result<Vec<Record>, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_record = false;
    let mut in_uid = false;
    let mut uid: Option<String> = None;
    let mut records = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                depth += 1;
                let name = e.local_name();
                if depth == 2 && name.as_ref() == RECORD_TAG.as_bytes() {
                    in_record = true;
                    start = before;
                    uid = None;
                } else if in_record && depth == 3 && name.as_ref() == UID_TAG.as_bytes() {
                    in_uid = true;
                    uid = Some(String::new());
                }
            }
            Event::Empty(e) => {
                if depth == 1 && e.local_name().as_ref() == RECORD_TAG.as_bytes() {
                    let end = reader.buffer_position() as usize;
                    records.push(Record::new(None, &xml[before..end]));
                }
            }
            Event::Text(t) if in_uid => {
                if let Some(id) = uid.as_mut() {
                    id.push_str(t.unescape()?.trim());
                }
            }
            Event::End(_) => {
                if in_uid && depth == 3 {
                    in_uid = false;
                } else if in_record && depth == 2 {
                    in_record = false;
                    let end = reader.buffer_position() as usize;
                    records.push(Record::new(uid.take(), &xml[start..end]));
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    Ok(records)
}

/// Inner markup of a page's `<records>` wrapper, or nothing for an empty page.
fn page_body(page: &str) -> &str {
    let Some(open) = RECORDS_OPEN.find(page) else {
        return "";
    };
    if open.as_str().ends_with("/>") {
        return "";
    }
    let body = &page[open.end()..];
    let body = RECORDS_CLOSE.find(body).map_or(body, |close| &body[..close.start()]);
    body.trim_matches(|c| c == '\n' || c == '\r')
}

/// Merge several pages into one document under a single `<records>` root.
#[must_use]
pub fn merge_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let bodies: Vec<&str> = pages
        .iter()
        .map(|p| page_body(p.as_ref()))
        .filter(|b| !b.trim().is_empty())
        .collect();

    format!("{XML_DECLARATION}\n<records>{}</records>", bodies.join("\n"))
}
