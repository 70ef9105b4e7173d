//! AT commands of the WE310 firmware
//!
//! Commands are declared as [AtatCmd] structs and encoded to a [Command] line before sending.
use crate::config::SocketKind;
use crate::error::Step;
use crate::responses::{Handle, NoResponse};
use alloc::vec;
use alloc::vec::Vec;
use atat::atat_derive::AtatCmd;
use atat::heapless::String;
use atat::heapless_bytes::Bytes;
use atat::AtatCmd;

/// Encoded command bytes, written to the transport as is
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    bytes: Vec<u8>,
}

impl Command {
    /// Encodes an AT command, including the trailing CR+LF
    pub fn encode<Cmd: AtatCmd>(command: &Cmd) -> Self {
        let mut bytes = vec![0x0; Cmd::MAX_LEN];
        let length = command.write(&mut bytes);
        bytes.truncate(length);

        Self { bytes }
    }

    /// Raw command line. CR+LF gets appended.
    pub fn line(text: &str) -> Self {
        let mut bytes = Vec::with_capacity(text.len() + 2);
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(b"\r\n");

        Self { bytes }
    }

    /// Raw data without line terminator
    pub fn payload(data: &[u8]) -> Self {
        Self { bytes: data.to_vec() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Maps commands to the step they are sent in, used for annotating transport errors
pub trait CommandStep {
    const STEP: Step;
}

/// Plain `AT`, used for waking up the command interpreter
#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse)]
pub struct AttentionCommand;

impl CommandStep for AttentionCommand {
    const STEP: Step = Step::Attention;
}

/// Sets the WIFI network interface mode and returns the interface handle
#[derive(Clone, AtatCmd)]
#[at_cmd("+WNI", NoResponse)]
pub struct NetworkInterfaceCommand {
    /// Interface mode:
    ///     0: Station mode.
    ///     1: Access point mode.
    #[at_arg(position = 0)]
    mode: u8,
}

impl NetworkInterfaceCommand {
    pub fn station_mode() -> Self {
        Self { mode: 0 }
    }
}

impl CommandStep for NetworkInterfaceCommand {
    const STEP: Step = Step::StationMode;
}

/// Queries the configuration of the network interfaces, including the link state
#[derive(Clone, AtatCmd)]
#[at_cmd("+WNIFCFG", NoResponse)]
pub struct InterfaceConfigCommand;

impl CommandStep for InterfaceConfigCommand {
    const STEP: Step = Step::LinkStatus;
}

/// Associates the given interface with an access point
#[derive(Clone, AtatCmd)]
#[at_cmd("+WNCN", NoResponse)]
pub struct AssociateCommand {
    /// Interface handle returned by WNI command, sent unquoted
    #[at_arg(position = 0)]
    handle: Bytes<8>,

    /// The SSID of the target access point
    #[at_arg(position = 1)]
    ssid: String<32>,

    /// The password/key of the target access point
    #[at_arg(position = 2)]
    password: String<64>,
}

impl AssociateCommand {
    /// Returns None if SSID or password exceed the max. length
    pub fn new(handle: &Handle, ssid: &str, password: &str) -> Option<Self> {
        Some(Self {
            handle: handle.to_argument(),
            ssid: bounded(ssid)?,
            password: bounded(password)?,
        })
    }
}

impl CommandStep for AssociateCommand {
    const STEP: Step = Step::Association;
}

/// Resolves the IP address of a host name
#[derive(Clone, AtatCmd)]
#[at_cmd("+NDNSCRURL", NoResponse)]
pub struct ResolveHostCommand {
    #[at_arg(position = 0)]
    host: String<128>,
}

impl ResolveHostCommand {
    /// Returns None if the host name exceeds the max. length
    pub fn new(host: &str) -> Option<Self> {
        Some(Self { host: bounded(host)? })
    }
}

impl CommandStep for ResolveHostCommand {
    const STEP: Step = Step::Resolution;
}

/// Opens a socket and returns the connection identifier
#[derive(Clone, AtatCmd)]
#[at_cmd("+SC", NoResponse)]
pub struct SocketOpenCommand {
    /// 2: IPv4
    #[at_arg(position = 0)]
    family: u8,

    /// 1: stream, 2: datagram
    #[at_arg(position = 1)]
    socket_type: u8,

    /// 0: derived from socket type
    #[at_arg(position = 2)]
    protocol: u8,
}

impl SocketOpenCommand {
    pub fn new(kind: SocketKind) -> Self {
        let (family, socket_type, protocol) = kind.arguments();
        Self {
            family,
            socket_type,
            protocol,
        }
    }
}

impl CommandStep for SocketOpenCommand {
    const STEP: Step = Step::SocketOpen;
}

/// Soft reset of the module
#[derive(Clone, AtatCmd)]
#[at_cmd("+YSR", NoResponse)]
pub struct SoftResetCommand;

impl CommandStep for SoftResetCommand {
    const STEP: Step = Step::SoftReset;
}

/// Firmware version
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMR", NoResponse)]
pub struct FirmwareVersionCommand;

impl CommandStep for FirmwareVersionCommand {
    const STEP: Step = Step::FirmwareVersion;
}

/// Module model
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGMM", NoResponse)]
pub struct ModelCommand;

impl CommandStep for ModelCommand {
    const STEP: Step = Step::ModelInfo;
}

/// Lists the stored SSL certificates
#[derive(Clone, AtatCmd)]
#[at_cmd("+NSSLCERTLIST", NoResponse)]
pub struct CertificateListCommand {
    #[at_arg(position = 0)]
    store: u8,
}

impl CertificateListCommand {
    pub fn new() -> Self {
        Self { store: 0 }
    }
}

impl CommandStep for CertificateListCommand {
    const STEP: Step = Step::CertificateList;
}

/// Header of a CA certificate upload. Gets directly followed by the certificate content, so the
/// header ends with a separator instead of a line terminator.
pub fn certificate_store_header(name: &str, length: usize) -> Command {
    let line = alloc::format!("AT+NSSLCERTSTORE=0,1,1,\"{}\",{},", name, length);
    Command::payload(line.as_bytes())
}

/// Copies the given text to a bounded string. Returns None if the text is too long.
fn bounded<const N: usize>(text: &str) -> Option<String<N>> {
    let mut string = String::new();
    string.push_str(text).ok()?;
    Some(string)
}
