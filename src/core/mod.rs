pub mod adapter;
pub mod envelope;
pub mod fault;
pub mod gateway;
pub mod mapping;
pub mod transport;
pub mod xml;

pub use crate::domain::model::{Record, SearchCriteria, Servicio};
pub use crate::domain::ports::{SoapCall, SoapResponse, SoapTransport, Storage};
pub use crate::utils::error::Result;
