use crate::domain::model::Servicio;
use crate::utils::error::{EsbError, Result};
use serde::Serialize;

pub const CSV_HEADER: [&str; 8] = [
    "Empresa",
    "Categoria",
    "IdServicio",
    "Nombre",
    "Tipo",
    "Ciudad",
    "Precio",
    "Clasificacion",
];

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn to_csv(services: &[Servicio]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for servicio in services {
        let precio = servicio.precio.map(|p| format!("{:.2}", p)).unwrap_or_default();
        writer.write_record([
            servicio.empresa.as_str(),
            servicio.categoria.as_str(),
            servicio.id_servicio.as_str(),
            servicio.nombre.as_str(),
            servicio.tipo.as_deref().unwrap_or_default(),
            servicio.ciudad.as_deref().unwrap_or_default(),
            precio.as_str(),
            servicio.clasificacion.as_deref().unwrap_or_default(),
        ])?;
    }

    let data = writer.into_inner().map_err(|e| EsbError::IoError(e.into_error()))?;
    String::from_utf8(data).map_err(|e| EsbError::MappingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}
