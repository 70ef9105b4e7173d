//! # Failure reporting
//!
//! Every failure of the driver is reported as [Error], which names the [Step] that failed and the
//! [ErrorKind]. Failures are never retried, except for the bounded association loop.
use core::fmt;

/// Step of the connection sequence (or diagnostic command) an error occurred in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Initial `AT` handshake
    Attention,
    /// Enabling station mode and obtaining the interface handle
    StationMode,
    /// Querying the Wi-Fi link status
    LinkStatus,
    /// Associating to the access point
    Association,
    /// Resolving the remote host name
    Resolution,
    /// Opening a socket and obtaining the connection identifier
    SocketOpen,
    /// Module soft reset
    SoftReset,
    /// Firmware version query
    FirmwareVersion,
    /// Module model query
    ModelInfo,
    /// Listing stored certificates
    CertificateList,
    /// Uploading a certificate
    CertificateStore,
    /// Releasing the transport at the end of a session
    Close,
}

/// Cause of a failure
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Writing to or reading from the byte stream failed
    Transport(embedded_io::ErrorKind),

    /// An expected field or keyword is missing in the modem reply
    Parse,

    /// All association attempts were used up without the link coming up
    AssociationExhausted,

    /// Upstream timer error
    Timer,
}

/// Failure of a single step. Aborts the running sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Error {
    /// Step which failed
    pub step: Step,

    /// Cause
    pub kind: ErrorKind,
}

impl Error {
    pub(crate) fn new(step: Step, kind: ErrorKind) -> Self {
        Self { step, kind }
    }

    /// Annotates an error kind with the given step
    pub(crate) fn at(step: Step) -> impl Fn(ErrorKind) -> Self {
        move |kind| Self::new(step, kind)
    }

    pub(crate) fn parse(step: Step) -> Self {
        Self::new(step, ErrorKind::Parse)
    }

    pub(crate) fn transport<E: embedded_io::Error>(step: Step, error: E) -> Self {
        Self::new(step, ErrorKind::Transport(error.kind()))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Attention => "attention",
            Step::StationMode => "station mode",
            Step::LinkStatus => "link status",
            Step::Association => "association",
            Step::Resolution => "resolution",
            Step::SocketOpen => "socket open",
            Step::SoftReset => "soft reset",
            Step::FirmwareVersion => "firmware version",
            Step::ModelInfo => "model info",
            Step::CertificateList => "certificate list",
            Step::CertificateStore => "certificate store",
            Step::Close => "close",
        };

        f.write_str(name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport(kind) => write!(f, "transport error ({:?})", kind),
            ErrorKind::Parse => f.write_str("unexpected reply"),
            ErrorKind::AssociationExhausted => f.write_str("association attempts exhausted"),
            ErrorKind::Timer => f.write_str("timer error"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.kind)
    }
}

/// Invalid connection configuration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Given SSID is longer then the max. size of 32 chars
    InvalidSsidLength,

    /// Given password is longer then the max. size of 63 chars
    InvalidPasswordLength,

    /// Given host name is longer then the max. size of 128 chars
    InvalidHostLength,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        let step = match self.step {
            Step::Attention => "Attention",
            Step::StationMode => "StationMode",
            Step::LinkStatus => "LinkStatus",
            Step::Association => "Association",
            Step::Resolution => "Resolution",
            Step::SocketOpen => "SocketOpen",
            Step::SoftReset => "SoftReset",
            Step::FirmwareVersion => "FirmwareVersion",
            Step::ModelInfo => "ModelInfo",
            Step::CertificateList => "CertificateList",
            Step::CertificateStore => "CertificateStore",
            Step::Close => "Close",
        };

        match self.kind {
            ErrorKind::Transport(_) => defmt::write!(f, "Error::Transport({})", step),
            ErrorKind::Parse => defmt::write!(f, "Error::Parse({})", step),
            ErrorKind::AssociationExhausted => defmt::write!(f, "Error::AssociationExhausted({})", step),
            ErrorKind::Timer => defmt::write!(f, "Error::Timer({})", step),
        }
    }
}
