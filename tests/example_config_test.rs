use booking_esb::utils::validation::Validate;
use booking_esb::{Gateway, GatewayConfig, HttpTransport, ServiceCategory};
use std::path::Path;

#[test]
fn test_shipped_example_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("esb-config.example.toml");
    let config = GatewayConfig::from_file(&path).unwrap();

    config.validate().unwrap();
    assert_eq!(config.timeout_seconds(), 30);
    assert_eq!(config.companies.len(), 3);

    let gateway = Gateway::from_config(&config, HttpTransport::new());
    let companies = gateway.companies();

    // sabores-del-sur está deshabilitado
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[1].category, ServiceCategory::Car);
    assert!(companies[0].operations.contains(&"reserve".to_string()));
}
