//! WOKMWS SOAP envelopes and response parsing.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;

use crate::error::{ClientError, ClientResult, XmlError};
use crate::models::SearchPage;

const ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const AUTH_NS: &str = "http://auth.cxf.wokmws.thomsonreuters.com";
const SEARCH_NS: &str = "http://woksearch.v3.wokmws.thomsonreuters.com";

/// Database searched by `woksearch:search`.
pub const DATABASE_ID: &str = "WOS";

/// Query language passed with every search.
pub const QUERY_LANGUAGE: &str = "en";

fn envelope(prefix: &str, namespace: &str, body: &str) -> String {
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"{ENVELOPE_NS}\" xmlns:{prefix}=\"{namespace}\">\
         <soapenv:Header/><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"
    )
}

/// `auth:authenticate` request.
#[must_use]
pub fn authenticate_envelope() -> String {
    envelope("auth", AUTH_NS, "<auth:authenticate/>")
}

/// `auth:closeSession` request.
#[must_use]
pub fn close_session_envelope() -> String {
    envelope("auth", AUTH_NS, "<auth:closeSession/>")
}

fn retrieve_parameters(count: usize, offset: usize) -> String {
    format!(
        "<retrieveParameters><firstRecord>{offset}</firstRecord><count>{count}</count></retrieveParameters>"
    )
}

/// `woksearch:search` request for `query`, returning `count` records from `offset` (1-based).
#[must_use]
pub fn search_envelope(query: &str, count: usize, offset: usize) -> String {
    let body = format!(
        "<woksearch:search><queryParameters>\
         <databaseId>{DATABASE_ID}</databaseId>\
         <userQuery>{}</userQuery>\
         <queryLanguage>{QUERY_LANGUAGE}</queryLanguage>\
         </queryParameters>{}</woksearch:search>",
        escape(query),
        retrieve_parameters(count, offset)
    );
    envelope("woksearch", SEARCH_NS, &body)
}

/// `woksearch:retrieve` request continuing an earlier search.
#[must_use]
pub fn retrieve_envelope(query_id: &str, count: usize, offset: usize) -> String {
    let body = format!(
        "<woksearch:retrieve><queryId>{}</queryId>{}</woksearch:retrieve>",
        escape(query_id),
        retrieve_parameters(count, offset)
    );
    envelope("woksearch", SEARCH_NS, &body)
}

/// Unescaped text of the first element with the given local name.
fn first_text(body: &str, name: &str) -> Result<Option<String>, XmlError> {
    let mut reader = Reader::from_str(body);
    let mut text: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Eof => return Ok(None),
            Event::Start(e) => {
                if text.is_some() {
                    depth += 1;
                } else if e.local_name().as_ref() == name.as_bytes() {
                    text = Some(String::new());
                }
            }
            Event::Empty(e) => {
                if text.is_none() && e.local_name().as_ref() == name.as_bytes() {
                    return Ok(Some(String::new()));
                }
            }
            Event::Text(t) => {
                if let Some(buf) = text.as_mut() {
                    buf.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(buf) = text.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if text.is_some() {
                    if depth == 0 {
                        return Ok(text);
                    }
                    depth -= 1;
                }
            }
            _ => {}
        }
    }
}

fn required(body: &str, name: &'static str) -> ClientResult<String> {
    first_text(body, name)?.ok_or(ClientError::MissingField(name))
}

/// `faultstring` of a SOAP fault, if the body is one.
#[must_use]
pub fn parse_fault(body: &str) -> Option<String> {
    if !body.contains("Fault") {
        return None;
    }
    first_text(body, "faultstring").ok().flatten().map(|s| s.trim().to_string())
}

/// Session id from an `authenticateResponse`.
pub fn parse_session(body: &str) -> ClientResult<String> {
    Ok(required(body, "return")?.trim().to_string())
}

/// Page from a `searchResponse`.
pub fn parse_search(body: &str) -> ClientResult<SearchPage> {
    let query_id = required(body, "queryId")?.trim().to_string();
    let found = required(body, "recordsFound")?;
    let records_found = found
        .trim()
        .parse()
        .map_err(|_| ClientError::InvalidField { field: "recordsFound", value: found.clone() })?;
    let records = first_text(body, "records")?.unwrap_or_default();

    Ok(SearchPage { records, records_found, query_id })
}

/// Records document from a `retrieveResponse`.
pub fn parse_retrieve(body: &str) -> ClientResult<String> {
    Ok(first_text(body, "records")?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_response(found: u64, records: &str) -> String {
        format!(
            "<soap:Envelope xmlns:soap=\"{ENVELOPE_NS}\"><soap:Body>\
             <ns2:searchResponse xmlns:ns2=\"{SEARCH_NS}\"><return>\
             <queryId>7</queryId><recordsFound>{found}</recordsFound>\
             <recordsSearched>1000</recordsSearched><records>{records}</records>\
             </return></ns2:searchResponse></soap:Body></soap:Envelope>"
        )
    }

    #[test]
    fn test_search_envelope_escapes_query() {
        let xml = search_envelope("DO=\"10.1/a<b>\"", 5, 101);
        assert!(xml.contains("<userQuery>DO=&quot;10.1/a&lt;b&gt;&quot;</userQuery>"));
        assert!(xml.contains("<firstRecord>101</firstRecord><count>5</count>"));
        assert!(xml.contains("<databaseId>WOS</databaseId>"));
    }

    #[test]
    fn test_retrieve_envelope() {
        let xml = retrieve_envelope("3", 100, 201);
        assert!(xml.contains("<woksearch:retrieve><queryId>3</queryId>"));
        assert!(xml.contains("<firstRecord>201</firstRecord>"));
    }

    #[test]
    fn test_parse_search_unescapes_records() {
        let body = search_response(2, "&lt;records&gt;&lt;REC/&gt;&lt;/records&gt;");
        let page = parse_search(&body).unwrap();
        assert_eq!(page.query_id, "7");
        assert_eq!(page.records_found, 2);
        assert_eq!(page.records, "<records><REC/></records>");
    }

    #[test]
    fn test_parse_search_missing_query_id() {
        let err = parse_search("<return><recordsFound>1</recordsFound></return>").unwrap_err();
        assert!(matches!(err, ClientError::MissingField("queryId")));
    }

    #[test]
    fn test_parse_session() {
        let body = "<soap:Envelope><soap:Body><ns2:authenticateResponse>\
                    <return>2F7hTVXoSID</return></ns2:authenticateResponse></soap:Body></soap:Envelope>";
        assert_eq!(parse_session(body).unwrap(), "2F7hTVXoSID");
    }

    #[test]
    fn test_parse_fault() {
        let body = "<soap:Envelope><soap:Body><soap:Fault><faultcode>soap:Server</faultcode>\
                    <faultstring>(ServerFault) Invalid query</faultstring></soap:Fault></soap:Body></soap:Envelope>";
        assert_eq!(parse_fault(body).as_deref(), Some("(ServerFault) Invalid query"));
        assert!(parse_fault(&search_response(0, "")).is_none());
    }
}
