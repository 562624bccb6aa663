// src/process/response.rs

use roxmltree::{Document, Node};
use tracing::{debug, instrument, trace};

use crate::error::ProcessError;

/// Result codes the portal uses for a successful call.
pub const SUCCESS_CODES: &[&str] = &["00", "0", "000"];

/// `resultCode` / `resultMsg` pair from the response header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    pub code: String,
    pub message: String,
}

impl Header {
    pub fn is_success(&self) -> bool {
        SUCCESS_CODES.contains(&self.code.as_str())
    }
}

/// One `<item>`: child element names and their text, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of `name`. A name repeated inside one item resolves to its last value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(self.fields.len());
        for (k, _) in &self.fields {
            if !names.contains(k) {
                names.push(k.clone());
            }
        }
        names
    }

}

/// Parsed trade response.
#[derive(Clone, Debug, Default)]
pub struct TradeResponse {
    pub header: Option<Header>,
    /// `body/totalCount`, when the server sent one.
    pub total_count: Option<u64>,
    pub items: Vec<Record>,
}

impl TradeResponse {
    /// Parse the XML body. Items are collected from anywhere in the document.
    #[instrument(level = "debug", skip_all, fields(xml_len = xml.len()))]
    pub fn parse(xml: &str) -> Result<Self, ProcessError> {
        let doc = Document::parse(xml.trim_start_matches('\u{feff}'))?;
        let root = doc.root_element();

        let header = parse_header(root)?;
        let total_count = root
            .descendants()
            .find(|n| n.has_tag_name("totalCount"))
            .and_then(|n| n.text())
            .and_then(|t| t.trim().parse().ok());

        // `.//item`: the root itself is never an item
        let items: Vec<Record> = root
            .descendants()
            .skip(1)
            .filter(|n| n.has_tag_name("item"))
            .map(record_from_item)
            .collect();

        debug!(
            items = items.len(),
            total_count = ?total_count,
            "parsed response"
        );
        Ok(Self {
            header,
            total_count,
            items,
        })
    }

    /// True unless a header carries a non-success code.
    pub fn is_success(&self) -> bool {
        self.header.as_ref().map_or(true, Header::is_success)
    }

    /// Column list taken from the first item.
    pub fn columns(&self) -> Vec<String> {
        self.items
            .first()
            .map(Record::field_names)
            .unwrap_or_default()
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).map(|n| n.text().unwrap_or_default().trim().to_string())
}

/// Regular `header` element, or the gateway's `cmmMsgHeader` envelope
/// returned for key and quota failures.
fn parse_header(root: Node<'_, '_>) -> Result<Option<Header>, ProcessError> {
    if let Some(h) = child(root, "header") {
        let code = child_text(h, "resultCode").ok_or(ProcessError::MissingField("resultCode"))?;
        let message = child_text(h, "resultMsg").unwrap_or_default();
        return Ok(Some(Header { code, message }));
    }

    if let Some(h) = child(root, "cmmMsgHeader") {
        let code = child_text(h, "returnReasonCode")
            .ok_or(ProcessError::MissingField("returnReasonCode"))?;
        let message = child_text(h, "returnAuthMsg")
            .filter(|m| !m.is_empty())
            .or_else(|| child_text(h, "errMsg"))
            .unwrap_or_default();
        return Ok(Some(Header { code, message }));
    }

    Ok(None)
}

fn record_from_item(item: Node<'_, '_>) -> Record {
    let fields = item
        .children()
        .filter(Node::is_element)
        .map(|c| {
            let name = c.tag_name().name().to_string();
            let value = c.text().unwrap_or_default().to_string();
            trace!(name = %name, value = %value, "field");
            (name, value)
        })
        .collect();
    Record::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<response>
  <header><resultCode>000</resultCode><resultMsg>OK</resultMsg></header>
  <body>
    <items>
      <item><aptNm>경희궁의아침3단지</aptNm><dealAmount>130,000</dealAmount><floor>9</floor></item>
      <item><aptNm>광화문스페이스본</aptNm><dealAmount>185,000</dealAmount><floor></floor></item>
    </items>
    <numOfRows>100</numOfRows><pageNo>1</pageNo><totalCount>2</totalCount>
  </body>
</response>"#;

    #[test]
    fn parses_header_items_and_total() {
        let resp = TradeResponse::parse(SAMPLE).unwrap();
        assert_eq!(
            resp.header,
            Some(Header {
                code: "000".into(),
                message: "OK".into()
            })
        );
        assert!(resp.is_success());
        assert_eq!(resp.total_count, Some(2));
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.columns(), vec!["aptNm", "dealAmount", "floor"]);
        assert_eq!(resp.items[0].get("aptNm"), Some("경희궁의아침3단지"));
        assert_eq!(resp.items[1].get("dealAmount"), Some("185,000"));
        assert_eq!(resp.items[1].get("floor"), Some(""));
        assert_eq!(resp.items[1].get("missing"), None);
    }

    #[test]
    fn non_success_code() {
        let xml = "<response><header><resultCode>99</resultCode><resultMsg>LIMITED</resultMsg></header></response>";
        let resp = TradeResponse::parse(xml).unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.header.unwrap().code, "99");
    }

    #[test]
    fn missing_header_counts_as_success() {
        let resp = TradeResponse::parse("<response><body><items/></body></response>").unwrap();
        assert!(resp.header.is_none());
        assert!(resp.is_success());
        assert!(resp.items.is_empty());
        assert!(resp.columns().is_empty());
    }

    #[test]
    fn header_without_result_code_is_an_error() {
        let err = TradeResponse::parse("<response><header><resultMsg>x</resultMsg></header></response>")
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingField("resultCode")));
    }

    #[test]
    fn gateway_envelope_is_a_header() {
        let xml = r#"<OpenAPI_ServiceResponse>
  <cmmMsgHeader>
    <errMsg>SERVICE ERROR</errMsg>
    <returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg>
    <returnReasonCode>30</returnReasonCode>
  </cmmMsgHeader>
</OpenAPI_ServiceResponse>"#;
        let resp = TradeResponse::parse(xml).unwrap();
        let header = resp.header.clone().unwrap();
        assert_eq!(header.code, "30");
        assert_eq!(header.message, "SERVICE_KEY_IS_NOT_REGISTERED_ERROR");
        assert!(!resp.is_success());
    }

    #[test]
    fn malformed_xml() {
        let err = TradeResponse::parse("<response><header>").unwrap_err();
        assert!(matches!(err, ProcessError::MalformedXml(_)));
    }

    #[test]
    fn items_found_at_any_depth() {
        let xml = "<r><item><a>1</a></item><x><y><item><a>2</a></item></y></x></r>";
        let resp = TradeResponse::parse(xml).unwrap();
        let values: Vec<_> = resp.items.iter().filter_map(|r| r.get("a")).collect();
        assert_eq!(values, vec!["1", "2"]);
    }

    #[test]
    fn root_element_is_not_an_item() {
        let resp = TradeResponse::parse("<item><a>1</a><item><a>2</a></item></item>").unwrap();
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].get("a"), Some("2"));
    }

    #[test]
    fn repeated_field_keeps_last_value() {
        let r = Record::new(vec![
            ("a".into(), "1".into()),
            ("b".into(), "2".into()),
            ("a".into(), "3".into()),
        ]);
        assert_eq!(r.get("a"), Some("3"));
        assert_eq!(r.field_names(), vec!["a", "b"]);
    }
}
