use crate::core::xml::parse_document;
use crate::domain::model::{Record, ServiceCategory, Servicio};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 取出 `{op}Response/{op}Result`；找不到時退回唯一的子元素
pub fn extract_result(operation: &str, payload: &Value) -> Value {
    let result_key = format!("{}Result", operation);

    let result = match payload {
        Value::Object(obj) => match obj.get(&result_key) {
            Some(result) => result.clone(),
            None if obj.len() == 1 => obj.values().next().cloned().unwrap_or(Value::Null),
            None => payload.clone(),
        },
        other => other.clone(),
    };

    decode_embedded(result)
}

/// 有些服務把 XML 或 JSON 當成字串放在 Result 裡
fn decode_embedded(value: Value) -> Value {
    let Value::String(text) = &value else {
        return value;
    };

    let trimmed = text.trim();
    if trimmed.starts_with('<') {
        match parse_document(trimmed) {
            Ok(document) => return document,
            Err(e) => tracing::debug!("Result string looked like XML but did not parse: {}", e),
        }
    } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(json) => return json,
            Err(e) => tracing::debug!("Result string looked like JSON but did not parse: {}", e),
        }
    }

    value
}

/// 依文件順序收集所有 `item_element` 物件
pub fn collect_items(value: &Value, item_element: &str) -> Vec<Map<String, Value>> {
    let mut items = Vec::new();
    collect_into(value, item_element, &mut items);

    if items.is_empty() {
        if let Value::Object(obj) = value {
            // 單一物件本身就是項目 (例如取得明細時)，缺 IdServicio/Nombre 的由 from_record 略過
            items.push(obj.clone());
        }
    }

    items
}

fn collect_into(value: &Value, item_element: &str, items: &mut Vec<Map<String, Value>>) {
    match value {
        Value::Object(obj) => {
            if let Some(found) = obj.get(item_element) {
                match found {
                    Value::Object(item) => items.push(item.clone()),
                    Value::Array(list) => {
                        items.extend(list.iter().filter_map(|v| v.as_object().cloned()))
                    }
                    _ => {}
                }
                return;
            }
            for child in obj.values() {
                collect_into(child, item_element, items);
            }
        }
        Value::Array(list) => {
            for child in list {
                collect_into(child, item_element, items);
            }
        }
        _ => {}
    }
}

/// 支援以點號表示的多階層路徑，例如 "Hotel.Ubicacion.Ciudad"
pub fn get_nested_value<'a>(item: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = item.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    Some(current)
}

/// 保留所有頂層欄位，再依映射寫入目標欄位
pub fn apply_field_mapping(
    item: &Map<String, Value>,
    field_mapping: &HashMap<String, String>,
) -> Record {
    let mut data: HashMap<String, Value> = item
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (source_path, target) in field_mapping {
        match get_nested_value(item, source_path) {
            Some(value) => {
                data.insert(target.clone(), value.clone());
            }
            None => tracing::debug!("Mapped field '{}' not present in item", source_path),
        }
    }

    Record { data }
}

/// 完全相符優先；否則取不分大小寫相符的欄位中鍵值排序最小者
fn lookup<'a>(record: &'a Record, field: &str) -> Option<&'a Value> {
    if let Some(value) = record.data.get(field) {
        return Some(value);
    }

    let mut candidates: Vec<(&String, &Value)> = record
        .data
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(field))
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(b.0));

    if candidates.len() > 1 {
        tracing::warn!(
            "⚠️ Ambiguous field {}: {:?}, using '{}'",
            field,
            candidates.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>(),
            candidates[0].0
        );
    }

    candidates.first().map(|(_, value)| *value)
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    match lookup(record, field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// 價格可能是數字或字串 ("$120.50", "120,50")
pub fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|p| p.is_finite()),
        Value::String(s) => {
            let cleaned = s.trim().trim_start_matches('$').trim();
            if cleaned.is_empty() {
                return None;
            }
            let normalized = if cleaned.contains('.') {
                cleaned.to_string()
            } else {
                cleaned.replace(',', ".")
            };
            normalized.parse::<f64>().ok().filter(|p| p.is_finite())
        }
        _ => None,
    }
}

impl Servicio {
    /// 缺少 IdServicio 或 Nombre 的項目無法轉換
    pub fn from_record(record: &Record, categoria: ServiceCategory, empresa: &str) -> Option<Self> {
        let id_servicio = text_field(record, "IdServicio")?;
        let nombre = text_field(record, "Nombre")?;

        let precio = lookup(record, "Precio").and_then(|value| {
            let parsed = parse_price(value);
            if parsed.is_none() && !value.is_null() {
                tracing::warn!("⚠️ {}: unparsable Precio {} for service {}", empresa, value, id_servicio);
            }
            parsed
        });

        Some(Self {
            id_servicio,
            nombre,
            tipo: text_field(record, "Tipo"),
            ciudad: text_field(record, "Ciudad"),
            precio,
            clasificacion: text_field(record, "Clasificacion"),
            descripcion: text_field(record, "Descripcion"),
            politicas: text_field(record, "Politicas"),
            reglas: text_field(record, "Reglas"),
            categoria,
            empresa: empresa.to_string(),
        })
    }
}
