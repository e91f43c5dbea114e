use crate::config::{Command, OutputFormat};
use crate::core::gateway::Gateway;
use crate::domain::ports::SoapTransport;
use crate::utils::error::{EsbError, Result};
use crate::utils::export::{to_csv, to_json};

/// 執行 CLI 指令並回傳要輸出的文字
pub async fn execute<T: SoapTransport + Clone>(
    gateway: &Gateway<T>,
    command: &Command,
    format: OutputFormat,
) -> Result<String> {
    match command {
        Command::Companies => match format {
            OutputFormat::Json => to_json(&gateway.companies()),
            OutputFormat::Csv => Err(csv_unavailable("companies")),
        },
        Command::Search {
            company, category, ..
        } => {
            // search_criteria 對 Search 一定有值
            let criteria = command.search_criteria().unwrap_or_default();
            match company {
                Some(company) => {
                    let services = gateway.search(company, &criteria).await?;
                    match format {
                        OutputFormat::Json => to_json(&services),
                        OutputFormat::Csv => to_csv(&services),
                    }
                }
                None => {
                    let aggregated = gateway.search_all(&criteria, *category).await;
                    match format {
                        OutputFormat::Json => to_json(&aggregated),
                        OutputFormat::Csv => to_csv(&aggregated.services),
                    }
                }
            }
        }
        Command::Details { company, id } => {
            let servicio = gateway.details(company, id).await?;
            match format {
                OutputFormat::Json => to_json(&servicio),
                OutputFormat::Csv => to_csv(servicio.as_slice()),
            }
        }
        Command::Invoke {
            company,
            operation,
            params,
        } => {
            let result = gateway.invoke(company, operation, params.clone()).await?;
            match format {
                OutputFormat::Json => to_json(&result),
                OutputFormat::Csv => Err(csv_unavailable("invoke")),
            }
        }
    }
}

fn csv_unavailable(command: &str) -> EsbError {
    EsbError::ConfigError {
        message: format!(
            "CSV output is only available for search and details, not {}",
            command
        ),
    }
}
