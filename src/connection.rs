//! # Connection sequence
//!
//! Drives the complete sequence:
//!
//! 1. `AT` handshake
//! 2. Enabling station mode, which returns the interface handle
//! 3. Joining the access point with a bounded number of attempts
//! 4. Resolving the remote host
//! 5. Opening a socket, which returns the connection identifier
//!
//! Every failure aborts the sequence. Handles are only used after they got parsed successfully,
//! so no command is ever sent with a missing handle.
//!
//! ## Example
//!
//! ````
//! # use we310_at::example::{ExampleSerial, ExampleTimer};
//! # use we310_at::config::{Config, Timings};
//! # use we310_at::connection::run_session;
//! # use core::net::{IpAddr, Ipv4Addr};
//! #
//! let config = Config::new("test_wifi", "secret").unwrap();
//! let connection = run_session::<_, _, 1_000, 64>(
//!     ExampleSerial::default(),
//!     ExampleTimer::default(),
//!     Timings::default(),
//!     &config,
//! )
//! .unwrap();
//!
//! assert_eq!("0", connection.handle.as_str());
//! assert_eq!(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10)), connection.address);
//! assert_eq!("1", connection.socket.cid().as_str());
//! ````
use crate::adapter::Adapter;
use crate::commands::AttentionCommand;
use crate::config::{Config, Timings};
use crate::error::{Error, Step};
use crate::responses::Handle;
use crate::stack::Socket;
use crate::transport::Transport;
use crate::wifi::{ConnectionState, WifiAdapter};
use alloc::string::String;
use core::net::IpAddr;
use fugit_timer::Timer;
use log::{error, info, warn};

/// Result of a successful connection sequence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    /// Handle of the station interface
    pub handle: Handle,

    /// Resolved address of the remote host
    pub address: IpAddr,

    /// Opened socket
    pub socket: Socket,
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<T, C, TIMER_HZ, RX_SIZE> {
    /// Runs the complete connection sequence. On failure the state is set to
    /// [ConnectionState::Failed] and the failed step is returned.
    pub fn connect(&mut self, config: &Config<'_>) -> Result<Connection, Error> {
        self.state = ConnectionState::Disconnected;

        match self.run_sequence(config) {
            Ok(connection) => Ok(connection),
            Err(failure) => {
                error!("Connection sequence aborted: {}", failure);
                self.state = ConnectionState::Failed;
                Err(failure)
            }
        }
    }

    /// Wakes up the command interpreter. The first `AT` after a reset gets rejected by the
    /// firmware, so the command is sent twice and only the second reply is returned.
    pub fn attention(&mut self) -> Result<String, Error> {
        self.send_command(&AttentionCommand)?;
        self.transact(&AttentionCommand)
    }

    fn run_sequence(&mut self, config: &Config<'_>) -> Result<Connection, Error> {
        self.attention()?;

        let handle = self.enable_station_mode()?;
        self.join(&handle, config)?;

        let address = self.resolve(config.host)?;
        let socket = self.open_socket(config.socket)?;

        info!("Connected, CID {}", socket.cid());
        Ok(Connection {
            handle,
            address,
            socket,
        })
    }
}

/// Runs the connection sequence on the given transport and closes the transport on every exit path.
///
/// A failing close after a failed sequence is logged, the sequence error is returned.
pub fn run_session<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize>(
    transport: T,
    timer: C,
    timings: Timings<TIMER_HZ>,
    config: &Config<'_>,
) -> Result<Connection, Error> {
    let mut adapter: Adapter<T, C, TIMER_HZ, RX_SIZE> = Adapter::with_timings(transport, timer, timings);
    let result = adapter.connect(config);

    let (mut transport, _) = adapter.release();
    let closed = transport.close();

    match (result, closed) {
        (Ok(connection), Ok(_)) => Ok(connection),
        (Ok(_), Err(close_error)) => Err(Error::transport(Step::Close, close_error)),
        (Err(failure), Err(close_error)) => {
            warn!("Closing transport failed: {:?}", embedded_io::Error::kind(&close_error));
            Err(failure)
        }
        (Err(failure), Ok(_)) => Err(failure),
    }
}
