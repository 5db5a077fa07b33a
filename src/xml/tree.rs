use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::core::InvoiceError;
use crate::lookup::{ATTR_KEY, TEXT_KEY};

/// Parse XML text into a nested map/list tree.
///
/// Shape of the result:
/// - an element becomes an object keyed by the children's qualified names;
/// - repeated siblings with the same name become an array;
/// - a text-only element becomes a string;
/// - an element with attributes keeps them under `"$"` and its text under `"_"`.
///
/// The returned object has a single key, the root element's name.
pub fn parse_tree(xml: &str) -> Result<Value, InvoiceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(Frame::open(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let frame = Frame::open(e)?;
                let (name, value) = frame.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| InvoiceError::MalformedXml(e.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack.pop().ok_or_else(|| {
                    InvoiceError::MalformedXml("unexpected closing tag".into())
                })?;
                let (name, value) = frame.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(InvoiceError::MalformedXml(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(InvoiceError::MalformedXml(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    let (name, value) =
        root.ok_or_else(|| InvoiceError::MalformedXml("document has no root element".into()))?;
    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(Value::Object(doc))
}

struct Frame {
    name: String,
    attrs: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(e: &BytesStart<'_>) -> Result<Self, InvoiceError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut attrs = Map::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| InvoiceError::MalformedXml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            // Namespace declarations carry no invoice data.
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attr
                .unescape_value()
                .map_err(|e| InvoiceError::MalformedXml(e.to_string()))?;
            attrs.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            attrs,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim().to_string();
        let value = if self.children.is_empty() && self.attrs.is_empty() {
            Value::String(text)
        } else {
            let mut obj = self.children;
            if !text.is_empty() {
                obj.insert(TEXT_KEY.to_string(), Value::String(text));
            }
            if !self.attrs.is_empty() {
                obj.insert(ATTR_KEY.to_string(), Value::Object(self.attrs));
            }
            Value::Object(obj)
        };
        (self.name, value)
    }
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<(), InvoiceError> {
    let Some(parent) = stack.last_mut() else {
        if root.is_some() {
            return Err(InvoiceError::MalformedXml(
                "document has more than one root element".into(),
            ));
        }
        *root = Some((name, value));
        return Ok(());
    };

    match parent.children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let prev = existing.take();
            *existing = Value::Array(vec![prev, value]);
        }
        None => {
            parent.children.insert(name, value);
        }
    }
    Ok(())
}
