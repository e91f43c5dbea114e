use crate::config::toml_config::GatewayConfig;
use crate::core::adapter::ServiceAdapter;
use crate::domain::model::{
    AggregatedSearch, CompanyFailure, CompanySummary, SearchCriteria, ServiceCategory, Servicio,
};
use crate::domain::ports::SoapTransport;
use crate::utils::error::{EsbError, Result};
use chrono::Utc;
use serde_json::Value;

/// ESB：依公司名稱將呼叫路由到對應的供應商 adapter
pub struct Gateway<T: SoapTransport + Clone> {
    adapters: Vec<ServiceAdapter<T>>,
}

impl<T: SoapTransport + Clone> Gateway<T> {
    /// 只註冊啟用中的公司，順序與設定檔相同
    pub fn from_config(config: &GatewayConfig, transport: T) -> Self {
        let timeout = config.timeout_seconds();
        let adapters = config
            .enabled_companies()
            .map(|company| ServiceAdapter::new(company.clone(), transport.clone(), timeout))
            .collect::<Vec<_>>();

        tracing::info!("🔧 Gateway ready with {} companies", adapters.len());
        Self { adapters }
    }

    pub fn companies(&self) -> Vec<CompanySummary> {
        self.adapters.iter().map(|a| a.summary()).collect()
    }

    pub fn adapter(&self, company: &str) -> Result<&ServiceAdapter<T>> {
        self.adapters
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(company))
            .ok_or_else(|| EsbError::UnknownCompany {
                company: company.to_string(),
            })
    }

    pub async fn search(&self, company: &str, criteria: &SearchCriteria) -> Result<Vec<Servicio>> {
        self.adapter(company)?.search(criteria).await
    }

    pub async fn details(&self, company: &str, id: &str) -> Result<Option<Servicio>> {
        self.adapter(company)?.details(id).await
    }

    pub async fn invoke(
        &self,
        company: &str,
        operation: &str,
        params: Vec<(String, String)>,
    ) -> Result<Value> {
        self.adapter(company)?.invoke(operation, params).await
    }

    /// 依序查詢每家公司；失敗的公司記錄在 failures，不中斷其他公司
    pub async fn search_all(
        &self,
        criteria: &SearchCriteria,
        category: Option<ServiceCategory>,
    ) -> AggregatedSearch {
        let mut services = Vec::new();
        let mut failures = Vec::new();

        let selected = self
            .adapters
            .iter()
            .filter(|a| category.map_or(true, |c| a.category() == c));

        for adapter in selected {
            match adapter.search(criteria).await {
                Ok(found) => services.extend(found),
                Err(e) => {
                    tracing::warn!("⚠️ {}: excluded from results: {}", adapter.name(), e);
                    failures.push(CompanyFailure {
                        company: adapter.name().to_string(),
                        error: e.to_string(),
                        hint: e.recovery_suggestion(),
                    });
                }
            }
        }

        tracing::info!(
            "📊 Aggregated search: {} services, {} failed companies",
            services.len(),
            failures.len()
        );

        AggregatedSearch {
            fetched_at: Utc::now(),
            services,
            failures,
        }
    }
}
