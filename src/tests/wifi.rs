use crate::config::Config;
use crate::error::{Error, ErrorKind, Step};
use crate::responses::Handle;
use crate::tests::mock::{adapter, capture_warnings, take_warnings, Clock, MockSerial};
use crate::wifi::{ConnectionState, WifiAdapter};
use alloc::string::ToString;
use embedded_io::ErrorKind as IoErrorKind;

fn handle() -> Handle {
    Handle::parse("0").unwrap()
}

fn config() -> Config<'static> {
    Config::new("test_wifi", "secret").unwrap()
}

#[test]
fn test_enable_station_mode() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_reply(b"AT+WNI=0\r\n+WNI:0\r\n\r\nOK\r\n");

    let mut adapter = adapter(serial, &clock);
    let handle = adapter.enable_station_mode().unwrap();

    assert_eq!("0", handle.as_str());

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!(1, commands.len());
    assert_eq!("AT+WNI=0\r\n".to_string(), commands[0]);

    // Settle time + fixed response window
    assert_eq!(1_100, clock.now());
}

#[test]
fn test_enable_station_mode_spaced_handle() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_reply(b"+WNI: 1\r\nOK\r\n");

    let mut adapter = adapter(serial, &clock);
    assert_eq!("1", adapter.enable_station_mode().unwrap().as_str());
}

#[test]
fn test_enable_station_mode_error_reply() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_error_reply();

    let mut adapter = adapter(serial, &clock);
    let error = adapter.enable_station_mode().unwrap_err();

    assert_eq!(Error::new(Step::StationMode, ErrorKind::Parse), error);
}

#[test]
fn test_enable_station_mode_tag_without_handle() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_reply(b"+WNI:\r\nOK\r\n");

    let mut adapter = adapter(serial, &clock);
    let error = adapter.enable_station_mode().unwrap_err();

    assert_eq!(Error::new(Step::StationMode, ErrorKind::Parse), error);
}

#[test]
fn test_enable_station_mode_write_error() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.fail_write(0, IoErrorKind::Other);

    let mut adapter = adapter(serial, &clock);
    let error = adapter.enable_station_mode().unwrap_err();

    assert_eq!(
        Error::new(Step::StationMode, ErrorKind::Transport(IoErrorKind::Other)),
        error
    );
}

#[test]
fn test_is_up() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_up_reply();
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);

    assert!(adapter.is_up().unwrap());
    assert!(!adapter.is_up().unwrap());

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!("AT+WNIFCFG\r\n".to_string(), commands[0]);
}

#[test]
fn test_is_up_not_cached() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);

    assert!(adapter.is_up().unwrap());
    assert!(adapter.is_up().unwrap());
    assert_eq!(2, adapter.transport.count_commands("AT+WNIFCFG"));
}

#[test]
fn test_is_up_transport_error() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.fail_read(IoErrorKind::BrokenPipe);

    let mut adapter = adapter(serial, &clock);
    let error = adapter.is_up().unwrap_err();

    assert_eq!(
        Error::new(Step::LinkStatus, ErrorKind::Transport(IoErrorKind::BrokenPipe)),
        error
    );
}

#[test]
fn test_join_link_already_up() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap();

    assert_eq!(ConnectionState::Up, adapter.state());
    assert_eq!(0, adapter.transport.count_commands("AT+WNCN"));
}

#[test]
fn test_join_up_after_first_attempt() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.add_ok_reply();
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap();

    assert_eq!(ConnectionState::Up, adapter.state());

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!(4, commands.len());
    assert_eq!("AT+WNIFCFG\r\n".to_string(), commands[0]);
    assert_eq!("AT+WNCN=0,\"test_wifi\",\"secret\"\r\n".to_string(), commands[1]);
    assert_eq!("AT+WNIFCFG\r\n".to_string(), commands[2]);
    assert_eq!("AT+WNIFCFG\r\n".to_string(), commands[3]);
}

#[test]
fn test_join_attempt_timing() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.add_ok_reply();
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap();

    // Three status queries: 3 * (100 ms settle + 1000 ms window)
    // Association: 100 ms settle + 2000 ms grace + 5000 ms idle + 2000 ms pause
    assert_eq!(3 * 1_100 + 9_100, clock.now());
}

#[test]
fn test_join_association_reply_collected_until_idle() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.add_chunked_reply(alloc::vec![
        (3_000, &b"\r\nIP SUBNET GATEWAY\r\n"[..]),
        (6_000, &b"\r\nOK\r\n"[..]),
    ]);
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap();

    // Association gets written at 1100, the last chunk is seen at 7200 by the 500 ms polling,
    // followed by 5000 ms idle time and the 2000 ms pause
    assert_eq!(7_200 + 5_000 + 2_000 + 2 * 1_100, clock.now());
}

#[test]
fn test_join_exhausted() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    for _ in 0..3 {
        serial.add_link_down_reply();
        serial.add_ok_reply();
    }
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);
    let error = adapter.join(&handle(), &config()).unwrap_err();

    assert_eq!(Error::new(Step::Association, ErrorKind::AssociationExhausted), error);
    assert_eq!(ConnectionState::Failed, adapter.state());
    assert_eq!(3, adapter.transport.count_commands("AT+WNCN"));
    assert_eq!(4, adapter.transport.count_commands("AT+WNIFCFG"));
}

#[test]
fn test_join_custom_attempt_budget() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    for _ in 0..5 {
        serial.add_link_down_reply();
        serial.add_ok_reply();
    }
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);
    let error = adapter.join(&handle(), &config().with_attempts(5)).unwrap_err();

    assert_eq!(ErrorKind::AssociationExhausted, error.kind);
    assert_eq!(5, adapter.transport.count_commands("AT+WNCN"));
}

#[test]
fn test_join_zero_attempts() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);
    let error = adapter.join(&handle(), &config().with_attempts(0)).unwrap_err();

    assert_eq!(Error::new(Step::Association, ErrorKind::AssociationExhausted), error);
    assert_eq!(0, adapter.transport.count_commands("AT+WNCN"));
}

#[test]
fn test_join_association_write_error_not_retried() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.fail_write(1, IoErrorKind::Other);

    let mut adapter = adapter(serial, &clock);
    let error = adapter.join(&handle(), &config()).unwrap_err();

    assert_eq!(
        Error::new(Step::Association, ErrorKind::Transport(IoErrorKind::Other)),
        error
    );
    assert_eq!(1, adapter.transport.count_commands("AT+WNCN"));
}

#[test]
fn test_join_uses_handle() {
    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.add_ok_reply();
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&Handle::parse("2").unwrap(), &config()).unwrap();

    let commands = adapter.transport.get_commands_as_strings();
    assert_eq!("AT+WNCN=2,\"test_wifi\",\"secret\"\r\n".to_string(), commands[1]);
}

fn failed_attempt_warnings() -> usize {
    take_warnings()
        .iter()
        .filter(|warning| warning.starts_with("Association attempt failed"))
        .count()
}

#[test]
fn test_join_warns_after_each_failed_attempt() {
    capture_warnings();

    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    for _ in 0..3 {
        serial.add_link_down_reply();
        serial.add_ok_reply();
    }
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap_err();

    assert_eq!(3, failed_attempt_warnings());
}

#[test]
fn test_join_warns_only_for_failed_attempts() {
    capture_warnings();

    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();
    serial.add_ok_reply();
    serial.add_link_down_reply();
    serial.add_ok_reply();
    serial.add_link_up_reply();
    serial.add_link_up_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config()).unwrap();

    assert_eq!(2, adapter.transport.count_commands("AT+WNCN"));
    assert_eq!(1, failed_attempt_warnings());
}

#[test]
fn test_join_without_attempts_logs_no_attempt_warning() {
    capture_warnings();

    let clock = Clock::default();
    let mut serial = MockSerial::new(&clock);
    serial.add_link_down_reply();

    let mut adapter = adapter(serial, &clock);
    adapter.join(&handle(), &config().with_attempts(0)).unwrap_err();

    assert_eq!(0, failed_attempt_warnings());
}
