use super::*;

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert!(config.client_id.is_empty());
    assert!(config.username.is_none());
    assert!(config.password.is_none());
    assert_eq!(config.keep_alive, 60);
    assert!(config.clean_session);
    assert_eq!(config.packet_timeout, 5000);
    assert_eq!(config.max_retry_count, 3);
}

#[test]
fn test_validate_rejects_empty_client_id() {
    let config = ClientConfig::default();
    assert!(config.validate().is_err());

    let config = ClientConfig::new("device-1");
    assert!(config.validate().is_ok());
}

#[test]
fn test_deserialize_partial() {
    let json = r#"{"client_id": "sensor-7", "keep_alive": 30}"#;
    let mut de = serde_json::Deserializer::from_str(json);
    let config = ClientConfig::deserialize(&mut de).unwrap();
    assert_eq!(config.client_id, "sensor-7");
    assert_eq!(config.keep_alive, 30);
    // Unspecified fields take defaults
    assert!(config.clean_session);
    assert_eq!(config.packet_timeout, 5000);
}
