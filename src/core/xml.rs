use crate::utils::error::{EsbError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

/// SOAP 回應 Body 的內容
#[derive(Debug, Clone, PartialEq)]
pub enum SoapBody {
    Fault(Value),
    Payload { name: String, value: Value },
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
    nil: bool,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            name: local_name(start),
            children: Map::new(),
            text: String::new(),
            nil: is_nil(start)?,
        })
    }

    fn close(self) -> (String, Value) {
        let value = if !self.children.is_empty() {
            Value::Object(self.children)
        } else if self.nil || self.text.trim().is_empty() {
            Value::Null
        } else {
            Value::String(self.text.trim().to_string())
        };
        (self.name, value)
    }
}

fn xml_error(e: impl std::fmt::Display) -> EsbError {
    EsbError::XmlParse {
        message: e.to_string(),
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn is_nil(start: &BytesStart<'_>) -> Result<bool> {
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == b"nil" {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(value.trim() == "true");
        }
    }
    Ok(false)
}

/// 重複出現的同名元素轉為陣列
fn insert_child(parent: &mut Map<String, Value>, name: String, value: Value) {
    match parent.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(name, value);
        }
    }
}

/// 將 XML 文件轉為 JSON 樹，回傳 `{ 根元素名稱: 內容 }`
pub fn parse_document(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(start) => stack.push(Frame::open(&start)?),
            Event::Empty(start) => {
                let name = local_name(&start);
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, Value::Null),
                    None => root = Some((name, Value::Null)),
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(xml_error)?;
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(data) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| xml_error("unexpected closing tag"))?;
                let (name, value) = frame.close();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error(format!(
            "unclosed element <{}>",
            stack.last().map(|f| f.name.as_str()).unwrap_or_default()
        )));
    }

    let (name, value) = root.ok_or_else(|| xml_error("document has no root element"))?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

/// 解析 SOAP 回應，取出 Body 中的第一個元素
pub fn parse_envelope(xml: &str) -> Result<SoapBody> {
    let document = parse_document(xml)?;
    let (root_name, root_value) = first_entry(&document)
        .ok_or_else(|| xml_error("document has no root element"))?;

    if root_name != "Envelope" {
        // 部分 ASMX 端點直接回傳資料而沒有 Envelope
        return Ok(SoapBody::Payload {
            name: root_name.to_string(),
            value: root_value.clone(),
        });
    }

    let body = root_value
        .get("Body")
        .ok_or_else(|| xml_error("SOAP envelope has no Body"))?;

    match first_entry(body) {
        Some(("Fault", fault)) => Ok(SoapBody::Fault(fault.clone())),
        Some((name, value)) => Ok(SoapBody::Payload {
            name: name.to_string(),
            value: value.clone(),
        }),
        None => Ok(SoapBody::Payload {
            name: String::new(),
            value: Value::Null,
        }),
    }
}

fn first_entry(value: &Value) -> Option<(&str, &Value)> {
    value
        .as_object()
        .and_then(|obj| obj.iter().next())
        .map(|(k, v)| (k.as_str(), v))
}
