use crate::core::fault::parse_fault;
use crate::core::xml::{parse_envelope, SoapBody};
use crate::domain::ports::{SoapCall, SoapResponse, SoapTransport};
use crate::utils::error::{EsbError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

const EXCERPT_LEN: usize = 200;

/// 透過 HTTP POST 傳送 SOAP envelope
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SoapTransport for HttpTransport {
    async fn send(&self, call: SoapCall) -> Result<SoapResponse> {
        tracing::debug!("📡 POST {} (action: {})", call.endpoint, call.action);

        let mut request = self
            .client
            .post(&call.endpoint)
            .header(CONTENT_TYPE, call.version.content_type(&call.action))
            .timeout(call.timeout)
            .body(call.body);

        if let Some(soap_action) = call.version.soap_action_header(&call.action) {
            request = request.header("SOAPAction", soap_action);
        }

        for (key, value) in &call.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!("📡 Response status {} ({} bytes)", status, body.len());

        Ok(SoapResponse { status, body })
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((index, _)) => format!("{}...", &trimmed[..index]),
        None => trimmed.to_string(),
    }
}

/// 檢查回應：fault 一律轉為 SoapFault (ASMX 會以 500 回傳)，其他非 2xx 轉為 HttpStatus
pub fn check_response(endpoint: &str, response: SoapResponse) -> Result<(String, Value)> {
    let success = (200..300).contains(&response.status);

    match parse_envelope(&response.body) {
        Ok(SoapBody::Fault(fault)) => Err(EsbError::SoapFault(parse_fault(&fault))),
        Ok(SoapBody::Payload { name, value }) if success => Ok((name, value)),
        Err(e) if success => Err(e),
        _ => Err(EsbError::HttpStatus {
            status: response.status,
            endpoint: endpoint.to_string(),
            excerpt: excerpt(&response.body),
        }),
    }
}
