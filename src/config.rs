//! # Connection configuration
//!
//! Network parameters are passed as [Config] to the connection sequence, timing constants are held
//! by the [Adapter](crate::adapter::Adapter) as [Timings].
use crate::error::ConfigError;
use fugit::{ExtU32, TimerDurationU32};

/// Max. SSID length in bytes
pub const MAX_SSID_LENGTH: usize = 32;

/// Max. password length in bytes
pub const MAX_PASSWORD_LENGTH: usize = 63;

/// Max. host name length in bytes
pub const MAX_HOST_LENGTH: usize = 128;

/// Remote host resolved by default
pub const DEFAULT_HOST: &str = "api.thingspeak.com";

/// Default number of association attempts
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Socket type opened after the link is up
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SocketKind {
    /// IPv4 stream socket
    #[default]
    TcpV4,
    /// IPv4 datagram socket
    UdpV4,
}

impl SocketKind {
    /// Address family, socket type and protocol arguments of the socket open command
    pub(crate) fn arguments(&self) -> (u8, u8, u8) {
        match self {
            SocketKind::TcpV4 => (2, 1, 0),
            SocketKind::UdpV4 => (2, 2, 0),
        }
    }
}

/// Network parameters of a single connection sequence
#[derive(Clone, Debug)]
pub struct Config<'a> {
    pub(crate) ssid: &'a str,
    pub(crate) password: &'a str,
    pub(crate) host: &'a str,
    pub(crate) attempts: usize,
    pub(crate) socket: SocketKind,
}

impl<'a> Config<'a> {
    /// Creates a new configuration for the given access point
    pub fn new(ssid: &'a str, password: &'a str) -> Result<Self, ConfigError> {
        if ssid.len() > MAX_SSID_LENGTH {
            return Err(ConfigError::InvalidSsidLength);
        }

        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ConfigError::InvalidPasswordLength);
        }

        Ok(Self {
            ssid,
            password,
            host: DEFAULT_HOST,
            attempts: DEFAULT_ATTEMPTS,
            socket: SocketKind::default(),
        })
    }

    /// Sets the remote host which gets resolved once the link is up
    pub fn with_host(mut self, host: &'a str) -> Result<Self, ConfigError> {
        if host.len() > MAX_HOST_LENGTH {
            return Err(ConfigError::InvalidHostLength);
        }

        self.host = host;
        Ok(self)
    }

    /// Sets the number of association attempts. Zero means the link must already be up.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the socket type
    pub fn with_socket(mut self, socket: SocketKind) -> Self {
        self.socket = socket;
        self
    }

    pub fn ssid(&self) -> &str {
        self.ssid
    }

    pub fn host(&self) -> &str {
        self.host
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

/// Idle polling parameters: poll every `poll_interval` and stop after `max_idle` without new data
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IdlePolling<const TIMER_HZ: u32> {
    pub poll_interval: TimerDurationU32<TIMER_HZ>,
    pub max_idle: TimerDurationU32<TIMER_HZ>,
}

impl<const TIMER_HZ: u32> IdlePolling<TIMER_HZ> {
    pub fn millis(poll_interval: u32, max_idle: u32) -> Self {
        Self {
            poll_interval: TimerDurationU32::millis(poll_interval),
            max_idle: TimerDurationU32::millis(max_idle),
        }
    }
}

/// Timing constants of the transactions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timings<const TIMER_HZ: u32> {
    /// Delay after writing a command
    pub settle: TimerDurationU32<TIMER_HZ>,

    /// Window of the fixed response collection
    pub response_timeout: TimerDurationU32<TIMER_HZ>,

    /// Idle polling for replies of unpredictable length
    pub idle: IdlePolling<TIMER_HZ>,

    /// Delay after sending an association command before collecting the reply
    pub association_grace: TimerDurationU32<TIMER_HZ>,

    /// Idle polling of association replies
    pub association: IdlePolling<TIMER_HZ>,

    /// Pause after each association attempt
    pub retry_pause: TimerDurationU32<TIMER_HZ>,

    /// Idle polling of name resolution replies
    pub resolution: IdlePolling<TIMER_HZ>,

    /// Delay after a soft reset before collecting the reply
    pub reset_grace: TimerDurationU32<TIMER_HZ>,

    /// Idle polling of soft reset replies
    pub reset: IdlePolling<TIMER_HZ>,

    /// Delay after the certificate store header
    pub certificate_settle: TimerDurationU32<TIMER_HZ>,

    /// Idle polling of certificate store replies
    pub certificate: IdlePolling<TIMER_HZ>,
}

impl<const TIMER_HZ: u32> Default for Timings<TIMER_HZ> {
    fn default() -> Self {
        Self {
            settle: 100.millis(),
            response_timeout: 1_000.millis(),
            idle: IdlePolling::millis(100, 1_000),
            association_grace: 2_000.millis(),
            association: IdlePolling::millis(500, 5_000),
            retry_pause: 2_000.millis(),
            resolution: IdlePolling::millis(100, 1_000),
            reset_grace: 1_000.millis(),
            reset: IdlePolling::millis(100, 2_000),
            certificate_settle: 20.millis(),
            certificate: IdlePolling::millis(100, 3_000),
        }
    }
}
