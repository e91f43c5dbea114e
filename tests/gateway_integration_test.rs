use anyhow::Result;
use booking_esb::config::{Command, OutputFormat};
use booking_esb::domain::model::FaultDiagnosis;
use booking_esb::{
    app, EsbError, Gateway, GatewayConfig, HttpTransport, SearchCriteria, ServiceCategory,
};
use httpmock::prelude::*;
use std::time::Duration;

const HOTEL_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    <buscarServiciosResponse xmlns="http://tempuri.org/">
      <buscarServiciosResult>
        <ServicioDTO>
          <IdServicio>10</IdServicio>
          <Nombre>Hotel Colonial</Nombre>
          <Tipo>Habitacion doble</Tipo>
          <Ciudad>Quito</Ciudad>
          <Precio>85.50</Precio>
          <Clasificacion>4</Clasificacion>
          <Descripcion>Centro historico</Descripcion>
          <Politicas xsi:nil="true" />
          <Reglas>No mascotas</Reglas>
        </ServicioDTO>
        <ServicioDTO>
          <IdServicio>11</IdServicio>
          <Nombre>Hostal Andino</Nombre>
          <Ciudad>Quito</Ciudad>
          <Precio>40</Precio>
        </ServicioDTO>
      </buscarServiciosResult>
    </buscarServiciosResponse>
  </soap:Body>
</soap:Envelope>"#;

const EF_FAULT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>System.Web.Services.Protocols.SoapException: Server was unable to process request. ---&gt; System.InvalidOperationException: The Entity Framework provider type 'System.Data.Entity.SqlServer.SqlProviderServices, EntityFramework.SqlServer' registered in the application config file could not be loaded.</faultstring>
      <detail />
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

const CAR_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <listarAutosResponse xmlns="urn:autos">
      <listarAutosResult>
        <Flota>
          <AutoDTO><Codigo>A-1</Codigo><Modelo>Sedan</Modelo><Tarifa>45,00</Tarifa></AutoDTO>
        </Flota>
      </listarAutosResult>
    </listarAutosResponse>
  </env:Body>
</env:Envelope>"#;

fn gateway_config(hotel_url: &str, car_url: &str, timeout_seconds: u64) -> GatewayConfig {
    let content = format!(
        r#"
[gateway]
name = "integration-esb"
timeout_seconds = {timeout_seconds}

[[companies]]
name = "colonial"
category = "hotel"
endpoint = "{hotel_url}"
namespace = "http://tempuri.org/"
details_id_param = "codigo"

[companies.operations]
search = "buscarServicios"
details = "obtenerServicio"

[[companies]]
name = "rentacar"
category = "car"
endpoint = "{car_url}"
namespace = "urn:autos"
soap_version = "1.2"
item_element = "AutoDTO"

[companies.operations]
search = "listarAutos"
details = "obtenerAuto"

[companies.field_mapping]
Codigo = "IdServicio"
Modelo = "Nombre"
Tarifa = "Precio"
"#
    );

    let config = GatewayConfig::from_toml_str(&content).unwrap();
    config.validate_config().unwrap();
    config
}

#[tokio::test]
async fn test_search_single_company_over_http() -> Result<()> {
    let server = MockServer::start_async().await;

    let hotel_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/Hoteles.asmx")
                .header("soapaction", "\"http://tempuri.org/buscarServicios\"")
                .header("content-type", "text/xml; charset=utf-8")
                .body_contains("<ciudad>Quito</ciudad>");
            then.status(200)
                .header("content-type", "text/xml; charset=utf-8")
                .body(HOTEL_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let criteria = SearchCriteria {
        ciudad: Some("Quito".to_string()),
        ..Default::default()
    };
    let services = gateway.search("colonial", &criteria).await?;

    hotel_mock.assert_async().await;
    assert_eq!(services.len(), 2);

    let colonial = &services[0];
    assert_eq!(colonial.id_servicio, "10");
    assert_eq!(colonial.nombre, "Hotel Colonial");
    assert_eq!(colonial.precio, Some(85.5));
    assert_eq!(colonial.politicas, None);
    assert_eq!(colonial.reglas.as_deref(), Some("No mascotas"));
    assert_eq!(colonial.categoria, ServiceCategory::Hotel);
    assert_eq!(services[1].tipo, None);

    Ok(())
}

#[tokio::test]
async fn test_soap12_company_uses_action_in_content_type() -> Result<()> {
    let server = MockServer::start_async().await;

    let car_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/Autos.asmx").header(
                "content-type",
                "application/soap+xml; charset=utf-8; action=\"urn:autos/listarAutos\"",
            );
            then.status(200).body(CAR_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let services = gateway.search("RentACar", &SearchCriteria::default()).await?;

    car_mock.assert_async().await;
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].id_servicio, "A-1");
    assert_eq!(services[0].nombre, "Sedan");
    assert_eq!(services[0].precio, Some(45.0));
    assert_eq!(services[0].empresa, "rentacar");

    Ok(())
}

#[tokio::test]
async fn test_search_all_keeps_results_from_healthy_companies() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/Hoteles.asmx");
            then.status(500)
                .header("content-type", "text/xml; charset=utf-8")
                .body(EF_FAULT);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/Autos.asmx");
            then.status(200).body(CAR_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let aggregated = gateway.search_all(&SearchCriteria::default(), None).await;

    assert_eq!(aggregated.services.len(), 1);
    assert_eq!(aggregated.services[0].categoria, ServiceCategory::Car);
    assert_eq!(aggregated.failures.len(), 1);
    assert_eq!(aggregated.failures[0].company, "colonial");
    assert!(aggregated.failures[0].hint.contains("Entity Framework"));

    let only_cars = gateway
        .search_all(&SearchCriteria::default(), Some(ServiceCategory::Car))
        .await;
    assert!(only_cars.failures.is_empty());

    Ok(())
}

const HOTEL_DETAILS_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <obtenerServicioResponse xmlns="http://tempuri.org/">
      <obtenerServicioResult>
        <IdServicio>10</IdServicio>
        <Nombre>Hotel Colonial</Nombre>
        <Ciudad>Quito</Ciudad>
        <Precio>85.50</Precio>
        <Reglas>No mascotas</Reglas>
      </obtenerServicioResult>
    </obtenerServicioResponse>
  </soap:Body>
</soap:Envelope>"#;

const CAR_DETAILS_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <obtenerAutoResponse xmlns="urn:autos">
      <obtenerAutoResult>
        <Vehiculo><Codigo>A-7</Codigo><Modelo>SUV</Modelo></Vehiculo>
      </obtenerAutoResult>
    </obtenerAutoResponse>
  </env:Body>
</env:Envelope>"#;

#[tokio::test]
async fn test_details_sends_configured_id_param_and_returns_service() -> Result<()> {
    let server = MockServer::start_async().await;

    let details_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/Hoteles.asmx")
                .header("soapaction", "\"http://tempuri.org/obtenerServicio\"")
                .body_contains("<codigo>10</codigo>");
            then.status(200)
                .header("content-type", "text/xml; charset=utf-8")
                .body(HOTEL_DETAILS_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let servicio = gateway
        .details("colonial", "10")
        .await?
        .expect("service 10 should be found");

    details_mock.assert_async().await;
    assert_eq!(servicio.id_servicio, "10");
    assert_eq!(servicio.nombre, "Hotel Colonial");
    assert_eq!(servicio.precio, Some(85.5));
    assert_eq!(servicio.reglas.as_deref(), Some("No mascotas"));
    assert_eq!(servicio.empresa, "colonial");

    Ok(())
}

#[tokio::test]
async fn test_details_with_only_nested_fields_uses_field_mapping() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/Autos.asmx")
                .body_contains("<idServicio>A-7</idServicio>");
            then.status(200).body(CAR_DETAILS_RESPONSE);
        })
        .await;

    let mut config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let rentacar = &mut config.companies[1];
    if let Some(mapping) = rentacar.field_mapping.as_mut() {
        mapping.insert("Vehiculo.Codigo".to_string(), "IdServicio".to_string());
        mapping.insert("Vehiculo.Modelo".to_string(), "Nombre".to_string());
    }
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let servicio = gateway.details("rentacar", "A-7").await?;
    let servicio = servicio.expect("nested details should map to a service");
    assert_eq!(servicio.id_servicio, "A-7");
    assert_eq!(servicio.nombre, "SUV");
    assert_eq!(servicio.categoria, ServiceCategory::Car);

    Ok(())
}

#[tokio::test]
async fn test_fault_diagnosis_reaches_caller() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/Hoteles.asmx");
            then.status(500).body(EF_FAULT);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    match gateway.details("colonial", "10").await {
        Err(EsbError::SoapFault(fault)) => {
            assert_eq!(fault.code, "soap:Server");
            assert_eq!(fault.diagnosis, FaultDiagnosis::ProviderMisconfigured);
        }
        other => panic!("expected SOAP fault, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_slow_vendor_hits_timeout() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/Hoteles.asmx");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body(HOTEL_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 1);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    match gateway.search("colonial", &SearchCriteria::default()).await {
        Err(EsbError::HttpError(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_unknown_company_and_unsupported_operation() -> Result<()> {
    let config = gateway_config("http://127.0.0.1:9/Hoteles.asmx", "http://127.0.0.1:9/Autos.asmx", 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    assert!(matches!(
        gateway.search("nadie", &SearchCriteria::default()).await,
        Err(EsbError::UnknownCompany { .. })
    ));
    assert!(matches!(
        gateway.invoke("rentacar", "cancelarReserva", Vec::new()).await,
        Err(EsbError::UnsupportedOperation { .. })
    ));

    let companies = gateway.companies();
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0].operations, vec!["details".to_string(), "search".to_string()]);
    assert_eq!(companies[1].operations, vec!["details".to_string(), "search".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_execute_search_as_csv() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/Hoteles.asmx");
            then.status(200).body(HOTEL_RESPONSE);
        })
        .await;

    let config = gateway_config(&server.url("/Hoteles.asmx"), &server.url("/Autos.asmx"), 30);
    let gateway = Gateway::from_config(&config, HttpTransport::new());

    let command = Command::Search {
        company: Some("colonial".to_string()),
        category: None,
        ciudad: None,
        tipo: None,
        desde: None,
        hasta: None,
        precio_max: Some(50.0),
        params: Vec::new(),
    };

    let csv = app::execute(&gateway, &command, OutputFormat::Csv).await?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "colonial,hotel,11,Hostal Andino,,Quito,40.00,");

    assert!(app::execute(&gateway, &Command::Companies, OutputFormat::Csv)
        .await
        .is_err());

    Ok(())
}
