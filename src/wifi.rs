//! # WIFI access point client
//!
//! Enabling station mode, querying the link state and joining an access point with a bounded
//! number of attempts are supported.
//!
//! ## Example
//!
//! ````
//! # use we310_at::example::{ExampleSerial, ExampleTimer};
//! # use we310_at::adapter::Adapter;
//! # use we310_at::config::Config;
//! # use we310_at::wifi::{ConnectionState, WifiAdapter};
//! #
//! let mut adapter: Adapter<_, _, 1_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//! let config = Config::new("test_wifi", "secret").unwrap();
//!
//! // Station mode returns the interface handle required for joining
//! let handle = adapter.enable_station_mode().unwrap();
//! assert_eq!("0", handle.as_str());
//!
//! adapter.join(&handle, &config).unwrap();
//! assert_eq!(ConnectionState::Up, adapter.state());
//! assert!(adapter.is_up().unwrap());
//! ````
use crate::adapter::Adapter;
use crate::commands::{AssociateCommand, InterfaceConfigCommand, NetworkInterfaceCommand};
use crate::config::Config;
use crate::error::{Error, ErrorKind, Step};
use crate::responses::{
    contains_line_with, extract_keyword_value, find_line_containing, Handle, LINK_UP_MARKER, STATION_MODE_KEYWORD,
    STATION_MODE_TAG,
};
use crate::transport::Transport;
use alloc::string::String;
use core::fmt::Debug;
use fugit_timer::Timer;
use log::{info, trace, warn};

/// State of the connection sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing done yet or link is down
    Disconnected,
    /// Association attempts are running
    Associating,
    /// Link is up
    Up,
    /// Sequence was aborted
    Failed,
}

/// Wifi network adapter trait
pub trait WifiAdapter {
    /// Error of all operations
    type Error: Debug;

    /// Enables station mode and returns the handle of the station interface
    fn enable_station_mode(&mut self) -> Result<Handle, Self::Error>;

    /// Queries the interface state. Returns true if the link is up.
    /// Every call sends a new query, nothing is cached.
    fn is_up(&mut self) -> Result<bool, Self::Error>;

    /// Associates the given interface to the configured access point, unless the link is
    /// already up. At most `attempts` association commands are sent.
    fn join(&mut self, handle: &Handle, config: &Config<'_>) -> Result<(), Self::Error>;
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> WifiAdapter
    for Adapter<T, C, TIMER_HZ, RX_SIZE>
{
    type Error = Error;

    fn enable_station_mode(&mut self) -> Result<Handle, Error> {
        let reply = self.transact(&NetworkInterfaceCommand::station_mode())?;

        let handle = find_line_containing(&reply, STATION_MODE_TAG)
            .and_then(|line| extract_keyword_value(line, STATION_MODE_KEYWORD))
            .and_then(Handle::parse)
            .ok_or(Error::parse(Step::StationMode))?;

        info!("Station interface handle: {}", handle);
        Ok(handle)
    }

    fn is_up(&mut self) -> Result<bool, Error> {
        let reply = self.transact(&InterfaceConfigCommand)?;
        Ok(contains_line_with(&reply, LINK_UP_MARKER))
    }

    fn join(&mut self, handle: &Handle, config: &Config<'_>) -> Result<(), Error> {
        let mut attempts = config.attempts;

        while attempts > 0 && !self.is_up()? {
            if attempts < config.attempts {
                warn!("Association attempt failed, link is down. Attempts left: {}", attempts);
            }

            self.state = ConnectionState::Associating;
            info!(
                "Associating to \"{}\", attempts left: {}",
                config.ssid, attempts
            );

            self.associate(handle, config)?;
            attempts -= 1;

            let pause = self.timings.retry_pause;
            self.sleep(pause).map_err(Error::at(Step::Association))?;
        }

        if !self.is_up()? {
            if attempts < config.attempts {
                warn!("Association attempt failed, link is down. Attempts left: {}", attempts);
            }

            warn!("Link still down after {} association attempts", config.attempts);
            self.state = ConnectionState::Failed;
            return Err(Error::new(Step::Association, ErrorKind::AssociationExhausted));
        }

        info!("WIFI link is up");
        self.state = ConnectionState::Up;
        Ok(())
    }
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<T, C, TIMER_HZ, RX_SIZE> {
    /// Sends a single association command and returns the reply.
    /// Association timing varies, so the reply is collected by idle polling after a grace period.
    fn associate(&mut self, handle: &Handle, config: &Config<'_>) -> Result<String, Error> {
        // Lengths are validated by Config
        let command =
            AssociateCommand::new(handle, config.ssid, config.password).ok_or(Error::parse(Step::Association))?;
        self.send_command(&command)?;

        let grace = self.timings.association_grace;
        let polling = self.timings.association;
        self.sleep(grace).map_err(Error::at(Step::Association))?;

        let reply = self.collect_idle(polling).map_err(Error::at(Step::Association))?;
        trace!("Association reply: {:?}", reply.as_str());

        Ok(reply)
    }
}
