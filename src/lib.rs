#[cfg(feature = "cli")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, LocalStorage};

pub use config::GatewayConfig;
pub use crate::core::{adapter::ServiceAdapter, gateway::Gateway, transport::HttpTransport};
pub use domain::model::{AggregatedSearch, SearchCriteria, ServiceCategory, Servicio};
pub use utils::error::{EsbError, Result};
