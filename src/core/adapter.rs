use crate::config::toml_config::CompanyConfig;
use crate::core::envelope::SoapRequest;
use crate::core::mapping::{apply_field_mapping, collect_items, extract_result};
use crate::core::transport::check_response;
use crate::domain::model::{CompanySummary, SearchCriteria, ServiceCategory, Servicio};
use crate::domain::ports::{SoapCall, SoapTransport};
use crate::utils::error::{EsbError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub const SEARCH_OPERATION: &str = "search";
pub const DETAILS_OPERATION: &str = "details";

/// 單一供應商的 SOAP 介接：組 envelope、送出、解析、映射為 Servicio
pub struct ServiceAdapter<T: SoapTransport> {
    config: CompanyConfig,
    transport: T,
    timeout: Duration,
    empty_mapping: HashMap<String, String>,
}

impl<T: SoapTransport> ServiceAdapter<T> {
    pub fn new(config: CompanyConfig, transport: T, default_timeout_seconds: u64) -> Self {
        let timeout =
            Duration::from_secs(config.timeout_seconds.unwrap_or(default_timeout_seconds));
        Self {
            config,
            transport,
            timeout,
            empty_mapping: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn category(&self) -> ServiceCategory {
        self.config.category
    }

    pub fn summary(&self) -> CompanySummary {
        let mut operations: Vec<String> = self.config.operations.keys().cloned().collect();
        operations.sort();
        CompanySummary {
            name: self.config.name.clone(),
            category: self.config.category,
            endpoint: self.config.endpoint.clone(),
            operations,
        }
    }

    /// 接受邏輯名稱 (search) 或設定中的供應商操作名稱 (buscarServicios)
    fn resolve_operation(&self, name: &str) -> Result<String> {
        if let Some(vendor_name) = self.config.operations.get(name) {
            return Ok(vendor_name.clone());
        }
        if self.config.operations.values().any(|v| v == name) {
            return Ok(name.to_string());
        }
        Err(EsbError::UnsupportedOperation {
            company: self.config.name.clone(),
            operation: name.to_string(),
        })
    }

    fn rename_params(&self, params: Vec<(String, String)>) -> Vec<(String, String)> {
        match &self.config.param_mapping {
            Some(mapping) => params
                .into_iter()
                .map(|(name, value)| match mapping.get(&name) {
                    Some(renamed) => (renamed.clone(), value),
                    None => (name, value),
                })
                .collect(),
            None => params,
        }
    }

    async fn call(&self, operation: &str, params: Vec<(String, String)>) -> Result<Value> {
        let request = SoapRequest::new(&self.config.namespace, operation).params(params);
        let version = self.config.soap_version.unwrap_or_default();

        let headers = self
            .config
            .headers
            .as_ref()
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        let call = SoapCall {
            endpoint: self.config.endpoint.clone(),
            version,
            action: request.action(),
            body: request.to_xml(version),
            timeout: self.timeout,
            headers,
        };

        tracing::info!("📡 {}: calling {}", self.config.name, operation);

        let outcome = match self.transport.send(call).await {
            Ok(response) => check_response(&self.config.endpoint, response),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((_, payload)) => Ok(extract_result(operation, &payload)),
            Err(e) => {
                match &e {
                    EsbError::SoapFault(fault) => {
                        tracing::error!(
                            "❌ {}: SOAP fault from {} ({}): {}",
                            self.config.name,
                            operation,
                            fault.diagnosis.label(),
                            fault.message
                        );
                        tracing::error!("💡 {}", fault.diagnosis.hint());
                    }
                    other => {
                        tracing::error!("❌ {}: {} failed: {}", self.config.name, operation, other)
                    }
                }
                Err(e)
            }
        }
    }

    fn to_services(&self, result: &Value) -> Vec<Servicio> {
        let field_mapping = self
            .config
            .field_mapping
            .as_ref()
            .unwrap_or(&self.empty_mapping);

        collect_items(result, self.config.item_element())
            .iter()
            .filter_map(|item| {
                let record = apply_field_mapping(item, field_mapping);
                let servicio =
                    Servicio::from_record(&record, self.config.category, &self.config.name);
                if servicio.is_none() {
                    tracing::warn!(
                        "⚠️ {}: skipping item without IdServicio/Nombre (keys: {:?})",
                        self.config.name,
                        item.keys().collect::<Vec<_>>()
                    );
                }
                servicio
            })
            .collect()
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Servicio>> {
        let operation = self.resolve_operation(SEARCH_OPERATION)?;
        let params = self.rename_params(criteria.to_params());

        let result = self.call(&operation, params).await?;
        let services: Vec<Servicio> = self
            .to_services(&result)
            .into_iter()
            .filter(|s| criteria.accepts(s))
            .collect();

        tracing::info!("✅ {}: {} services found", self.config.name, services.len());
        Ok(services)
    }

    pub async fn details(&self, id: &str) -> Result<Option<Servicio>> {
        let operation = self.resolve_operation(DETAILS_OPERATION)?;
        let params = vec![(self.config.details_id_param().to_string(), id.to_string())];

        let result = self.call(&operation, params).await?;
        Ok(self.to_services(&result).into_iter().next())
    }

    /// 其他供應商操作 (例如訂房、可用性)，回傳未映射的 JSON
    pub async fn invoke(&self, operation: &str, params: Vec<(String, String)>) -> Result<Value> {
        let operation = self.resolve_operation(operation)?;
        let params = self.rename_params(params);
        self.call(&operation, params).await
    }
}
