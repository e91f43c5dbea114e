use crate::domain::model::SoapFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EsbError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("SOAP fault [{}]: {}", .0.code, .0.message)]
    SoapFault(SoapFault),

    #[error("Unexpected HTTP status {status} from {endpoint}: {excerpt}")]
    HttpStatus {
        status: u16,
        endpoint: String,
        excerpt: String,
    },

    #[error("Unknown company: {company}")]
    UnknownCompany { company: String },

    #[error("Company '{company}' does not support operation '{operation}'")]
    UnsupportedOperation { company: String, operation: String },

    #[error("Mapping error: {message}")]
    MappingError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Vendor,
    Data,
    Routing,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EsbError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EsbError::HttpError(_) | EsbError::HttpStatus { .. } => ErrorCategory::Network,
            EsbError::SoapFault(_) => ErrorCategory::Vendor,
            EsbError::XmlParse { .. }
            | EsbError::MappingError { .. }
            | EsbError::SerializationError(_)
            | EsbError::CsvError(_) => ErrorCategory::Data,
            EsbError::UnknownCompany { .. } | EsbError::UnsupportedOperation { .. } => {
                ErrorCategory::Routing
            }
            EsbError::ConfigError { .. }
            | EsbError::MissingConfigError { .. }
            | EsbError::InvalidConfigValueError { .. }
            | EsbError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            EsbError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 供應商端的錯誤通常稍後重試即可
            ErrorCategory::Network | ErrorCategory::Vendor => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Routing | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EsbError::HttpError(e) if e.is_timeout() => {
                "The vendor did not answer in time; raise timeout_seconds or try again later".to_string()
            }
            EsbError::HttpError(_) => {
                "Check network connectivity and that the vendor endpoint is reachable".to_string()
            }
            EsbError::HttpStatus { status, .. } if *status == 404 => {
                "The endpoint path is wrong; verify the .asmx URL in the company config".to_string()
            }
            EsbError::HttpStatus { .. } => {
                "The vendor returned an unexpected status; inspect the response excerpt".to_string()
            }
            EsbError::SoapFault(fault) => fault.diagnosis.hint().to_string(),
            EsbError::XmlParse { .. } => {
                "The vendor response is not well-formed XML; verify the endpoint returns SOAP".to_string()
            }
            EsbError::MappingError { .. } => {
                "Review item_element and field_mapping for this company".to_string()
            }
            EsbError::UnknownCompany { .. } => {
                "Run the `companies` command to list configured companies".to_string()
            }
            EsbError::UnsupportedOperation { .. } => {
                "Add the operation under [companies.operations] in the config file".to_string()
            }
            EsbError::ConfigError { .. }
            | EsbError::MissingConfigError { .. }
            | EsbError::InvalidConfigValueError { .. }
            | EsbError::ConfigValidationError { .. } => {
                "Fix the configuration file and run again".to_string()
            }
            EsbError::SerializationError(_) | EsbError::CsvError(_) => {
                "The result could not be serialized; try another output format".to_string()
            }
            EsbError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EsbError::SoapFault(fault) => format!(
                "The vendor service reported an error ({}): {}",
                fault.diagnosis.label(),
                fault.message
            ),
            EsbError::HttpError(_) | EsbError::HttpStatus { .. } => {
                format!("Could not talk to the vendor service: {}", self)
            }
            EsbError::UnknownCompany { company } => {
                format!("No company named '{}' is configured", company)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EsbError>;
