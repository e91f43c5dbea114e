use crate::domain::model::{ServiceCategory, Servicio, SoapVersion};
use crate::utils::error::{EsbError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_ITEM_ELEMENT: &str = "ServicioDTO";
pub const DEFAULT_DETAILS_ID_PARAM: &str = "idServicio";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub gateway: GatewaySettings,
    #[serde(default)]
    pub companies: Vec<CompanyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    pub name: String,
    pub description: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub category: ServiceCategory,
    pub endpoint: String,
    pub namespace: String,
    pub soap_version: Option<SoapVersion>,
    pub timeout_seconds: Option<u64>,
    pub item_element: Option<String>,
    pub details_id_param: Option<String>,
    pub enabled: Option<bool>,
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub operations: HashMap<String, String>, // 邏輯名稱 -> 供應商操作名稱
    pub param_mapping: Option<HashMap<String, String>>,
    pub field_mapping: Option<HashMap<String, String>>, // 供應商路徑 -> Servicio 欄位
}

impl CompanyConfig {
    pub fn item_element(&self) -> &str {
        self.item_element.as_deref().unwrap_or(DEFAULT_ITEM_ELEMENT)
    }

    pub fn details_id_param(&self) -> &str {
        self.details_id_param
            .as_deref()
            .unwrap_or(DEFAULT_DETAILS_ID_PARAM)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    fn validate_company(&self) -> Result<()> {
        let prefix = format!("companies.{}", self.name);

        validate_url(&format!("{}.endpoint", prefix), &self.endpoint)?;
        validate_non_empty_string(&format!("{}.namespace", prefix), &self.namespace)?;
        validate_non_empty_string(&format!("{}.item_element", prefix), self.item_element())?;

        if let Some(timeout) = self.timeout_seconds {
            validate_range(&format!("{}.timeout_seconds", prefix), timeout, 1, 300)?;
        }

        if self.operations.is_empty() {
            return Err(EsbError::ConfigValidationError {
                field: format!("{}.operations", prefix),
                message: "at least one operation must be configured".to_string(),
            });
        }

        for (logical, vendor) in &self.operations {
            validate_non_empty_string(&format!("{}.operations.{}", prefix, logical), vendor)?;
        }

        if let Some(mapping) = &self.field_mapping {
            for (source, target) in mapping {
                if !Servicio::FIELDS.contains(&target.as_str()) {
                    return Err(EsbError::InvalidConfigValueError {
                        field: format!("{}.field_mapping.{}", prefix, source),
                        value: target.clone(),
                        reason: format!("Unknown target field. Valid fields: {}", Servicio::FIELDS.join(", ")),
                    });
                }
            }
        }

        Ok(())
    }
}

impl GatewayConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EsbError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EsbError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 取得預設逾時秒數
    pub fn timeout_seconds(&self) -> u64 {
        self.gateway
            .timeout_seconds
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn enabled_companies(&self) -> impl Iterator<Item = &CompanyConfig> {
        self.companies.iter().filter(|c| c.is_enabled())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("gateway.name", &self.gateway.name)?;

        if let Some(timeout) = self.gateway.timeout_seconds {
            validate_range("gateway.timeout_seconds", timeout, 1, 300)?;
        }

        if self.companies.is_empty() {
            return Err(EsbError::MissingConfigError {
                field: "companies".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for company in &self.companies {
            validate_non_empty_string("companies.name", &company.name)?;
            // 路由時公司名稱不分大小寫
            if !seen.insert(company.name.to_ascii_lowercase()) {
                return Err(EsbError::InvalidConfigValueError {
                    field: "companies.name".to_string(),
                    value: company.name.clone(),
                    reason: "Company names must be unique (case-insensitive)".to_string(),
                });
            }
            company.validate_company()?;
        }

        Ok(())
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
