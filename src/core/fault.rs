use crate::domain::model::{FaultDiagnosis, SoapFault};
use regex::RegexSet;
use serde_json::Value;
use std::sync::OnceLock;

// 順序即優先順序：同時命中多個樣式時取第一個
const PATTERNS: [(&str, FaultDiagnosis); 9] = [
    (r"(?i)entity framework provider", FaultDiagnosis::ProviderMisconfigured),
    (r"(?i)login failed for user", FaultDiagnosis::DatabaseUnavailable),
    (r"(?i)network-related or instance-specific error", FaultDiagnosis::DatabaseUnavailable),
    (r"(?i)cannot open database", FaultDiagnosis::DatabaseUnavailable),
    (r"(?i)did not recognize the value of http header soapaction", FaultDiagnosis::UnknownAction),
    (r"(?i)actionnotsupported|no action", FaultDiagnosis::UnknownAction),
    (r"(?i)object reference not set to an instance", FaultDiagnosis::ServerNullReference),
    (r"(?i)timeout", FaultDiagnosis::Timeout),
    (r"(?i)timed out", FaultDiagnosis::Timeout),
];

fn pattern_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new(PATTERNS.iter().map(|(pattern, _)| *pattern))
            .expect("fault patterns are valid regexes")
    })
}

/// 以字串比對推斷 SOAP fault 的成因
pub fn diagnose(text: &str) -> FaultDiagnosis {
    pattern_set()
        .matches(text)
        .iter()
        .next()
        .map(|index| PATTERNS[index].1)
        .unwrap_or(FaultDiagnosis::Unknown)
}

/// 將元素內容攤平成純文字，供 detail 顯示與比對
fn flatten_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(obj) => obj
            .values()
            .map(flatten_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// 支援 SOAP 1.1 (faultcode/faultstring/detail) 與 1.2 (Code/Reason/Detail)
pub fn parse_fault(fault: &Value) -> SoapFault {
    let code = fault
        .get("faultcode")
        .or_else(|| fault.get("Code").and_then(|c| c.get("Value")))
        .map(flatten_text)
        .unwrap_or_else(|| "Unknown".to_string());

    let message = fault
        .get("faultstring")
        .or_else(|| fault.get("Reason").and_then(|r| r.get("Text")))
        .map(flatten_text)
        .unwrap_or_default();

    let detail = fault
        .get("detail")
        .or_else(|| fault.get("Detail"))
        .map(flatten_text)
        .filter(|d| !d.is_empty());

    let haystack = match &detail {
        Some(detail) => format!("{} {}", message, detail),
        None => message.clone(),
    };

    SoapFault {
        code,
        diagnosis: diagnose(&haystack),
        message,
        detail,
    }
}
