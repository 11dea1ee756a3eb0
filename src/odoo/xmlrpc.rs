//! XML-RPC encoding and decoding
//!
//! Odoo speaks plain XML-RPC over HTTP. Values travel through the rest of the
//! server as `serde_json::Value`, so this module maps between the two:
//! requests are written with a small string builder, responses are parsed with
//! `quick-xml` into a tree and then folded into JSON.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Number, Value};

use crate::error::OdooError;

/// Serialize a method call into an XML-RPC request document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut xml = String::with_capacity(256);
    xml.push_str("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    xml.push_str(&escape(method));
    xml.push_str("</methodName><params>");
    for param in params {
        xml.push_str("<param>");
        encode_value(param, &mut xml);
        xml.push_str("</param>");
    }
    xml.push_str("</params></methodCall>");
    xml
}

/// Append a single `<value>` element
pub fn encode_value(value: &Value, xml: &mut String) {
    xml.push_str("<value>");
    match value {
        Value::Null => xml.push_str("<nil/>"),
        Value::Bool(b) => {
            xml.push_str("<boolean>");
            xml.push(if *b { '1' } else { '0' });
            xml.push_str("</boolean>");
        }
        Value::Number(n) => encode_number(n, xml),
        Value::String(s) => {
            xml.push_str("<string>");
            xml.push_str(&escape(s.as_str()));
            xml.push_str("</string>");
        }
        Value::Array(items) => {
            xml.push_str("<array><data>");
            for item in items {
                encode_value(item, xml);
            }
            xml.push_str("</data></array>");
        }
        Value::Object(members) => {
            xml.push_str("<struct>");
            for (name, member) in members {
                xml.push_str("<member><name>");
                xml.push_str(&escape(name.as_str()));
                xml.push_str("</name>");
                encode_value(member, xml);
                xml.push_str("</member>");
            }
            xml.push_str("</struct>");
        }
    }
    xml.push_str("</value>");
}

fn encode_number(n: &Number, xml: &mut String) {
    if let Some(i) = n.as_i64() {
        if i32::try_from(i).is_ok() {
            xml.push_str(&format!("<int>{}</int>", i));
        } else {
            xml.push_str(&format!("<i8>{}</i8>", i));
        }
    } else {
        // u64 beyond i64::MAX falls through to a double as well
        let f = n.as_f64().unwrap_or_default();
        xml.push_str(&format!("<double>{:?}</double>", f));
    }
}

/// Parse an XML-RPC response document
///
/// Returns the single result value, or `OdooError::Fault` when the server
/// answered with a `<fault>`.
pub fn decode_response(body: &str) -> Result<Value, OdooError> {
    let root = parse_tree(body)?;

    let response = root
        .child("methodResponse")
        .ok_or_else(|| OdooError::malformed("missing <methodResponse>"))?;

    if let Some(fault) = response.child("fault") {
        let value = fault
            .child("value")
            .ok_or_else(|| OdooError::malformed("fault without <value>"))?;
        return Err(decode_fault(&decode_value(value)?));
    }

    let value = response
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| OdooError::malformed("missing <params><param><value>"))?;

    decode_value(value)
}

fn decode_fault(value: &Value) -> OdooError {
    let code = match value.get("faultCode") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let message = value
        .get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("unknown fault")
        .to_string();

    OdooError::Fault { code, message }
}

/// Minimal element tree built from the event stream
#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    text: String,
}

impl Node {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_tree(xml: &str) -> Result<Node, OdooError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Node::default()];

    loop {
        let event = reader.read_event().map_err(|e| {
            OdooError::malformed(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                stack.push(Node::named(name));
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::named(name));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| OdooError::malformed("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Err(OdooError::malformed("unbalanced end tag")),
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| OdooError::malformed(e.to_string()))?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        return Err(OdooError::malformed("unexpected end of document"));
    }

    stack
        .pop()
        .ok_or_else(|| OdooError::malformed("empty document"))
}

fn decode_value(node: &Node) -> Result<Value, OdooError> {
    match node.children.first() {
        // <value>text</value> without a type element is a string
        None => Ok(Value::String(node.text.clone())),
        Some(typed) => decode_typed(typed),
    }
}

fn decode_typed(node: &Node) -> Result<Value, OdooError> {
    let text = node.text.trim();

    match node.name.as_str() {
        "int" | "i4" | "i8" => text
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| OdooError::malformed(format!("invalid integer '{}'", text))),
        "boolean" => match text {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            _ => Err(OdooError::malformed(format!("invalid boolean '{}'", text))),
        },
        "string" => Ok(Value::String(node.text.clone())),
        "double" => {
            let f = text
                .parse::<f64>()
                .map_err(|_| OdooError::malformed(format!("invalid double '{}'", text)))?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        "dateTime.iso8601" => Ok(Value::String(text.to_string())),
        "base64" => Ok(Value::String(
            text.chars().filter(|c| !c.is_whitespace()).collect(),
        )),
        "nil" => Ok(Value::Null),
        "array" => {
            let data = node
                .child("data")
                .ok_or_else(|| OdooError::malformed("array without <data>"))?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut members = Map::new();
            for member in node.children_named("member") {
                let name = member
                    .child("name")
                    .ok_or_else(|| OdooError::malformed("struct member without <name>"))?;
                let value = member
                    .child("value")
                    .ok_or_else(|| OdooError::malformed("struct member without <value>"))?;
                members.insert(name.text.clone(), decode_value(value)?);
            }
            Ok(Value::Object(members))
        }
        other => Err(OdooError::malformed(format!(
            "unsupported XML-RPC type <{}>",
            other
        ))),
    }
}
