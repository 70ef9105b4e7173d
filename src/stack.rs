//! # Name resolution and socket provisioning
//!
//! Once the link is up, the remote host gets resolved and a socket is opened. Resolution is also
//! available through the [Dns] trait of [embedded_nal].
//!
//! ## Example
//!
//! ````
//! # use we310_at::example::{ExampleSerial, ExampleTimer};
//! # use we310_at::adapter::Adapter;
//! # use we310_at::config::SocketKind;
//! # use core::net::{IpAddr, Ipv4Addr};
//! # use embedded_nal::{AddrType, Dns};
//! #
//! let mut adapter: Adapter<_, _, 1_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! let address = adapter.get_host_by_name("api.thingspeak.com", AddrType::IPv4).unwrap();
//! assert_eq!(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10)), address);
//!
//! let socket = adapter.open_socket(SocketKind::TcpV4).unwrap();
//! assert_eq!("1", socket.cid().as_str());
//! ````
use crate::adapter::Adapter;
use crate::commands::{ResolveHostCommand, SocketOpenCommand};
use crate::config::SocketKind;
use crate::error::{Error, ErrorKind, Step};
use crate::responses::{
    extract_keyword_value, find_line_containing, parse_resolved_address, Handle, SOCKET_KEYWORD, SOCKET_TAG,
};
use crate::transport::Transport;
use core::net::IpAddr;
use embedded_nal::{AddrType, Dns};
use fugit_timer::Timer;
use log::{info, trace};

/// Socket opened on the modem
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Socket {
    /// Connection identifier returned by the modem
    pub(crate) cid: Handle,

    /// Socket type
    pub(crate) kind: SocketKind,
}

impl Socket {
    pub(crate) fn new(cid: Handle, kind: SocketKind) -> Self {
        Self { cid, kind }
    }

    /// Connection identifier required by all further socket commands
    pub fn cid(&self) -> &Handle {
        &self.cid
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<T, C, TIMER_HZ, RX_SIZE> {
    /// Resolves the IP address of the given host.
    /// Resolution time varies, so the reply is collected by a short idle polling.
    pub fn resolve(&mut self, host: &str) -> Result<IpAddr, Error> {
        let command = ResolveHostCommand::new(host).ok_or(Error::parse(Step::Resolution))?;
        self.send_command(&command)?;

        let polling = self.timings.resolution;
        let reply = self.collect_idle(polling).map_err(Error::at(Step::Resolution))?;
        trace!("Resolution reply: {:?}", reply.as_str());

        let address = parse_resolved_address(&reply, host).ok_or(Error::parse(Step::Resolution))?;
        info!("Resolved {} to {}", host, address);
        Ok(address)
    }

    /// Opens a new socket and returns it, including the connection identifier
    pub fn open_socket(&mut self, kind: SocketKind) -> Result<Socket, Error> {
        let reply = self.transact(&SocketOpenCommand::new(kind))?;

        let cid = find_line_containing(&reply, SOCKET_TAG)
            .and_then(|line| extract_keyword_value(line, SOCKET_KEYWORD))
            .and_then(Handle::parse)
            .ok_or(Error::parse(Step::SocketOpen))?;

        info!("Opened socket with CID {}", cid);
        Ok(Socket::new(cid, kind))
    }
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Dns
    for Adapter<T, C, TIMER_HZ, RX_SIZE>
{
    type Error = Error;

    /// Resolves the given host name. Returns a parse error if the modem resolved an address of
    /// another family than requested.
    fn get_host_by_name(&mut self, hostname: &str, addr_type: AddrType) -> nb::Result<IpAddr, Self::Error> {
        let address = self.resolve(hostname)?;

        match (addr_type, address) {
            (AddrType::Either, _) | (AddrType::IPv4, IpAddr::V4(_)) | (AddrType::IPv6, IpAddr::V6(_)) => Ok(address),
            _ => Err(nb::Error::Other(Error::parse(Step::Resolution))),
        }
    }

    /// Reverse lookups are not supported by the firmware
    fn get_host_by_address(&mut self, _addr: IpAddr, _result: &mut [u8]) -> nb::Result<usize, Self::Error> {
        Err(nb::Error::Other(Error::new(
            Step::Resolution,
            ErrorKind::Transport(embedded_io::ErrorKind::Unsupported),
        )))
    }
}
