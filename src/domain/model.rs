use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 單筆供應商項目經欄位映射後的原始資料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Hotel,
    Car,
    Restaurant,
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Hotel => "hotel",
            ServiceCategory::Car => "car",
            ServiceCategory::Restaurant => "restaurant",
            ServiceCategory::Other => "other",
        }
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hotel" | "hotels" | "hoteles" => Ok(ServiceCategory::Hotel),
            "car" | "cars" | "autos" => Ok(ServiceCategory::Car),
            "restaurant" | "restaurants" | "restaurantes" => Ok(ServiceCategory::Restaurant),
            "other" => Ok(ServiceCategory::Other),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SoapVersion {
    #[default]
    #[serde(rename = "1.1")]
    Soap11,
    #[serde(rename = "1.2")]
    Soap12,
}

impl SoapVersion {
    pub fn envelope_namespace(&self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "http://schemas.xmlsoap.org/soap/envelope/",
            SoapVersion::Soap12 => "http://www.w3.org/2003/05/soap-envelope",
        }
    }

    pub fn content_type(&self, action: &str) -> String {
        match self {
            SoapVersion::Soap11 => "text/xml; charset=utf-8".to_string(),
            SoapVersion::Soap12 => format!("application/soap+xml; charset=utf-8; action=\"{}\"", action),
        }
    }

    /// SOAP 1.1 需要帶引號的 SOAPAction 標頭；1.2 的 action 放在 Content-Type
    pub fn soap_action_header(&self, action: &str) -> Option<String> {
        match self {
            SoapVersion::Soap11 => Some(format!("\"{}\"", action)),
            SoapVersion::Soap12 => None,
        }
    }
}

/// 供應商回傳的服務 (ServicioDTO)，以供應商的欄位名稱序列化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Servicio {
    pub id_servicio: String,
    pub nombre: String,
    pub tipo: Option<String>,
    pub ciudad: Option<String>,
    pub precio: Option<f64>,
    pub clasificacion: Option<String>,
    pub descripcion: Option<String>,
    pub politicas: Option<String>,
    pub reglas: Option<String>,
    pub categoria: ServiceCategory,
    pub empresa: String,
}

impl Servicio {
    /// 可透過 field_mapping 寫入的欄位名稱
    pub const FIELDS: [&'static str; 9] = [
        "IdServicio",
        "Nombre",
        "Tipo",
        "Ciudad",
        "Precio",
        "Clasificacion",
        "Descripcion",
        "Politicas",
        "Reglas",
    ];
}

/// 搜尋條件，會轉換為供應商操作的參數
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub ciudad: Option<String>,
    pub tipo: Option<String>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub precio_max: Option<f64>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl SearchCriteria {
    /// 以標準參數名稱輸出 (ciudad, tipo, fechaInicio, fechaFin, precioMax)，額外參數接在後面
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ciudad) = &self.ciudad {
            params.push(("ciudad".to_string(), ciudad.clone()));
        }
        if let Some(tipo) = &self.tipo {
            params.push(("tipo".to_string(), tipo.clone()));
        }
        if let Some(fecha) = self.fecha_inicio {
            params.push(("fechaInicio".to_string(), fecha.format("%Y-%m-%d").to_string()));
        }
        if let Some(fecha) = self.fecha_fin {
            params.push(("fechaFin".to_string(), fecha.format("%Y-%m-%d").to_string()));
        }
        if let Some(precio) = self.precio_max {
            params.push(("precioMax".to_string(), precio.to_string()));
        }
        for (key, value) in &self.extra {
            params.push((key.clone(), value.clone()));
        }
        params
    }

    /// 價格已知且高於上限的服務不符合條件
    pub fn accepts(&self, servicio: &Servicio) -> bool {
        match (self.precio_max, servicio.precio) {
            (Some(max), Some(precio)) => precio <= max,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultDiagnosis {
    ProviderMisconfigured,
    DatabaseUnavailable,
    UnknownAction,
    ServerNullReference,
    Timeout,
    Unknown,
}

impl FaultDiagnosis {
    pub fn label(&self) -> &'static str {
        match self {
            FaultDiagnosis::ProviderMisconfigured => "data provider misconfigured",
            FaultDiagnosis::DatabaseUnavailable => "database unavailable",
            FaultDiagnosis::UnknownAction => "unknown SOAP action",
            FaultDiagnosis::ServerNullReference => "server null reference",
            FaultDiagnosis::Timeout => "vendor timeout",
            FaultDiagnosis::Unknown => "unclassified fault",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            FaultDiagnosis::ProviderMisconfigured => {
                "The vendor's Entity Framework provider is not registered on their server; contact the vendor, nothing can be fixed on our side"
            }
            FaultDiagnosis::DatabaseUnavailable => {
                "The vendor service cannot reach its database; try again later or contact the vendor"
            }
            FaultDiagnosis::UnknownAction => {
                "The operation name or namespace does not match the vendor WSDL; check [companies.operations] and namespace"
            }
            FaultDiagnosis::ServerNullReference => {
                "The vendor crashed on the request; usually a required parameter is missing or misnamed, check param_mapping"
            }
            FaultDiagnosis::Timeout => "The vendor timed out internally; try again later",
            FaultDiagnosis::Unknown => "Inspect the fault message and detail returned by the vendor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
    pub diagnosis: FaultDiagnosis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFailure {
    pub company: String,
    pub error: String,
    pub hint: String,
}

/// 多家公司搜尋的彙整結果，失敗的公司不影響其他公司的結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedSearch {
    pub fetched_at: DateTime<Utc>,
    pub services: Vec<Servicio>,
    pub failures: Vec<CompanyFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySummary {
    pub name: String,
    pub category: ServiceCategory,
    pub endpoint: String,
    pub operations: Vec<String>,
}
