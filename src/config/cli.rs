use crate::core::Storage;
use crate::domain::model::{SearchCriteria, ServiceCategory};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "booking-esb")]
#[command(about = "Query SOAP travel vendors (hotels, cars, restaurants) and normalize the results")]
pub struct CliConfig {
    /// Path to TOML gateway configuration
    #[arg(short, long, default_value = "esb-config.toml")]
    pub config: String,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List configured companies
    Companies,

    /// Search services; without --company every enabled company is queried
    Search {
        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        category: Option<ServiceCategory>,

        #[arg(long)]
        ciudad: Option<String>,

        #[arg(long)]
        tipo: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        desde: Option<NaiveDate>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        hasta: Option<NaiveDate>,

        #[arg(long)]
        precio_max: Option<f64>,

        /// Extra vendor parameter, key=value
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Fetch one service by id
    Details {
        #[arg(long)]
        company: String,

        #[arg(long)]
        id: String,
    },

    /// Call any configured vendor operation and print its raw result
    Invoke {
        #[arg(long)]
        company: String,

        #[arg(long)]
        operation: String,

        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
}

pub fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

impl Command {
    pub fn search_criteria(&self) -> Option<SearchCriteria> {
        match self {
            Command::Search {
                ciudad,
                tipo,
                desde,
                hasta,
                precio_max,
                params,
                ..
            } => Some(SearchCriteria {
                ciudad: ciudad.clone(),
                tipo: tipo.clone(),
                fecha_inicio: *desde,
                fecha_fin: *hasta,
                precio_max: *precio_max,
                extra: params.iter().cloned().collect(),
            }),
            _ => None,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        if let Command::Search {
            desde: Some(desde),
            hasta: Some(hasta),
            ..
        } = &self.command
        {
            if hasta < desde {
                return Err(crate::utils::error::EsbError::InvalidConfigValueError {
                    field: "hasta".to_string(),
                    value: hasta.to_string(),
                    reason: format!("End date is before start date {}", desde),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
