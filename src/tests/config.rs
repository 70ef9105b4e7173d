use crate::config::{Config, IdlePolling, SocketKind, Timings, DEFAULT_ATTEMPTS, DEFAULT_HOST};
use crate::error::ConfigError;

#[test]
fn test_defaults() {
    let config = Config::new("test_wifi", "secret").unwrap();

    assert_eq!("test_wifi", config.ssid());
    assert_eq!(DEFAULT_HOST, config.host());
    assert_eq!(DEFAULT_ATTEMPTS, config.attempts());
    assert_eq!(SocketKind::TcpV4, config.socket);
}

#[test]
fn test_builder() {
    let config = Config::new("test_wifi", "secret")
        .unwrap()
        .with_host("example.org")
        .unwrap()
        .with_attempts(5)
        .with_socket(SocketKind::UdpV4);

    assert_eq!("example.org", config.host());
    assert_eq!(5, config.attempts());
    assert_eq!(SocketKind::UdpV4, config.socket);
}

#[test]
fn test_ssid_too_long() {
    let ssid = "x".repeat(33);
    assert_eq!(ConfigError::InvalidSsidLength, Config::new(&ssid, "secret").unwrap_err());
    assert!(Config::new(&"x".repeat(32), "secret").is_ok());
}

#[test]
fn test_password_too_long() {
    let password = "x".repeat(64);
    assert_eq!(
        ConfigError::InvalidPasswordLength,
        Config::new("test_wifi", &password).unwrap_err()
    );
    assert!(Config::new("test_wifi", &"x".repeat(63)).is_ok());
}

#[test]
fn test_host_too_long() {
    let host = "x".repeat(129);
    let result = Config::new("test_wifi", "secret").unwrap().with_host(&host);

    assert_eq!(ConfigError::InvalidHostLength, result.unwrap_err());
}

#[test]
fn test_default_timings() {
    let timings: Timings<1_000> = Timings::default();

    assert_eq!(100, timings.settle.ticks());
    assert_eq!(1_000, timings.response_timeout.ticks());
    assert_eq!(IdlePolling::millis(100, 1_000), timings.idle);
    assert_eq!(2_000, timings.association_grace.ticks());
    assert_eq!(IdlePolling::millis(500, 5_000), timings.association);
    assert_eq!(2_000, timings.retry_pause.ticks());
    assert_eq!(IdlePolling::millis(100, 1_000), timings.resolution);
}

#[test]
fn test_timings_follow_timer_frequency() {
    let timings: Timings<1_000_000> = Timings::default();
    assert_eq!(100_000, timings.settle.ticks());
}
