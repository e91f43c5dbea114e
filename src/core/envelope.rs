use crate::domain::model::SoapVersion;
use quick_xml::escape::escape;

/// 一個 SOAP 操作呼叫：操作名稱、命名空間與依序排列的參數
#[derive(Debug, Clone)]
pub struct SoapRequest {
    namespace: String,
    operation: String,
    params: Vec<(String, String)>,
}

impl SoapRequest {
    pub fn new(namespace: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.params.push((name.into(), value.into()));
        }
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// ASMX 慣例：SOAPAction = 命名空間 + 操作名稱
    pub fn action(&self) -> String {
        if self.namespace.ends_with('/') {
            format!("{}{}", self.namespace, self.operation)
        } else {
            format!("{}/{}", self.namespace, self.operation)
        }
    }

    pub fn to_xml(&self, version: SoapVersion) -> String {
        let mut body = String::new();
        for (name, value) in &self.params {
            body.push_str(&format!("<{name}>{}</{name}>", escape(value.as_str())));
        }

        format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
                r#"xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="{envelope_ns}">"#,
                r#"<soap:Body><{operation} xmlns="{namespace}">{body}</{operation}></soap:Body>"#,
                r#"</soap:Envelope>"#
            ),
            envelope_ns = version.envelope_namespace(),
            operation = self.operation,
            namespace = escape(self.namespace.as_str()),
            body = body,
        )
    }
}
