use crate::domain::model::SoapVersion;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 一次 SOAP 呼叫所需的全部資訊
#[derive(Debug, Clone)]
pub struct SoapCall {
    pub endpoint: String,
    pub version: SoapVersion,
    pub action: String,
    pub body: String,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct SoapResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn send(&self, call: SoapCall) -> Result<SoapResponse>;
}
