//! # Command transactions
//!
//! Exactly one command is in flight at a time. A transaction writes the command, waits a settle
//! time and collects the reply with one of two strategies:
//!
//! * [Adapter::collect_fixed]: reads everything arriving within a fixed window. Used for replies
//!   with predictable timing.
//! * [Adapter::collect_until_idle]: reads until no new data arrived for a given idle time. Used for
//!   replies of unpredictable length, e.g. name resolution or association. Always waits out the
//!   idle time after the last byte.
//!
//! Invalid UTF-8 sequences of replies are replaced by `U+FFFD`.
//!
//! ## Example
//!
//! ````
//! # use we310_at::example::{ExampleSerial, ExampleTimer};
//! # use we310_at::adapter::Adapter;
//! # use we310_at::commands::Command;
//! # use fugit::ExtU32;
//! #
//! let mut adapter: Adapter<_, _, 1_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! adapter.send(&Command::line("AT+CGMM"), 100.millis()).unwrap();
//! let reply = adapter.collect_fixed(1_000.millis()).unwrap();
//! assert!(reply.contains("WE310G4"));
//! ````
use crate::commands::{Command, CommandStep};
use crate::config::{IdlePolling, Timings};
use crate::error::{Error, ErrorKind};
use crate::transport::Transport;
use crate::wifi::ConnectionState;
use alloc::string::String;
use alloc::vec::Vec;
use atat::AtatCmd;
use embedded_io::Error as _;
use fugit::TimerDurationU32;
use fugit_timer::Timer;
use log::{debug, trace};

/// Central client for the modem
///
/// RX_SIZE: Chunk size in bytes when reading from the transport. Higher value results in fewer
/// read calls, but introduces also higher stack memory footprint.
pub struct Adapter<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> {
    /// Byte stream connected to the modem
    pub(crate) transport: T,

    /// Timer used for delays and timeout measurement
    pub(crate) timer: C,

    /// Transaction timing constants
    pub(crate) timings: Timings<TIMER_HZ>,

    /// State of the connection sequence
    pub(crate) state: ConnectionState,
}

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<T, C, TIMER_HZ, RX_SIZE> {
    /// Creates a new adapter using the default timings
    pub fn new(transport: T, timer: C) -> Self {
        Self::with_timings(transport, timer, Timings::default())
    }

    pub fn with_timings(transport: T, timer: C, timings: Timings<TIMER_HZ>) -> Self {
        Self {
            transport,
            timer,
            timings,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn timings(&self) -> &Timings<TIMER_HZ> {
        &self.timings
    }

    pub fn set_timings(&mut self, timings: Timings<TIMER_HZ>) {
        self.timings = timings;
    }

    /// Returns the current state of the connection sequence
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns transport and timer
    pub fn release(self) -> (T, C) {
        (self.transport, self.timer)
    }

    /// Writes the command and waits the given settle time. Write errors are not retried.
    ///
    /// Data pending from earlier commands is discarded before writing, so every collected reply
    /// belongs to the last command sent.
    pub fn send(&mut self, command: &Command, settle: TimerDurationU32<TIMER_HZ>) -> Result<(), ErrorKind> {
        let mut stale = Vec::new();
        if self.drain(&mut stale)? > 0 {
            trace!("Discarding stale data: {:?}", Printable(&stale));
        }

        debug!("Sending {:?}", Printable(command.as_bytes()));

        self.transport
            .write(command.as_bytes())
            .map_err(|error| ErrorKind::Transport(error.kind()))?;
        self.sleep(settle)
    }

    /// Reads everything arriving until the timeout elapsed
    pub fn collect_fixed(&mut self, timeout: TimerDurationU32<TIMER_HZ>) -> Result<String, ErrorKind> {
        let mut reply = Vec::new();
        self.timer.start(timeout).map_err(|_| ErrorKind::Timer)?;

        loop {
            let expired = match self.timer.wait() {
                Ok(_) => true,
                Err(nb::Error::WouldBlock) => false,
                Err(nb::Error::Other(_)) => return Err(ErrorKind::Timer),
            };

            self.drain(&mut reply)?;

            if expired {
                break;
            }
        }

        Ok(Self::decode(reply))
    }

    /// Polls the transport every `poll_interval` until no new data arrived for `max_idle`.
    /// The idle time is reset every time new data arrives.
    pub fn collect_until_idle(
        &mut self,
        poll_interval: TimerDurationU32<TIMER_HZ>,
        max_idle: TimerDurationU32<TIMER_HZ>,
    ) -> Result<String, ErrorKind> {
        // A zero interval would never accumulate idle time
        let poll_interval = if poll_interval.ticks() == 0 {
            TimerDurationU32::from_ticks(1)
        } else {
            poll_interval
        };

        let mut reply = Vec::new();
        let mut idle = TimerDurationU32::<TIMER_HZ>::from_ticks(0);

        loop {
            if self.drain(&mut reply)? > 0 {
                idle = TimerDurationU32::from_ticks(0);
                continue;
            }

            self.sleep(poll_interval)?;
            idle = idle + poll_interval;

            if idle >= max_idle {
                break;
            }
        }

        Ok(Self::decode(reply))
    }

    /// Shorthand of [Adapter::collect_until_idle]
    pub fn collect_idle(&mut self, polling: IdlePolling<TIMER_HZ>) -> Result<String, ErrorKind> {
        self.collect_until_idle(polling.poll_interval, polling.max_idle)
    }

    /// Blocks for the given duration
    pub(crate) fn sleep(&mut self, duration: TimerDurationU32<TIMER_HZ>) -> Result<(), ErrorKind> {
        self.timer.start(duration).map_err(|_| ErrorKind::Timer)?;
        nb::block!(self.timer.wait()).map_err(|_| ErrorKind::Timer)
    }

    /// Encodes and sends a command using the default settle time. Errors are annotated by the
    /// step of the command.
    pub(crate) fn send_command<Cmd: AtatCmd + CommandStep>(&mut self, command: &Cmd) -> Result<(), Error> {
        let settle = self.timings.settle;
        self.send(&Command::encode(command), settle).map_err(Error::at(Cmd::STEP))
    }

    /// Sends a command and collects the reply within the default response window
    pub(crate) fn transact<Cmd: AtatCmd + CommandStep>(&mut self, command: &Cmd) -> Result<String, Error> {
        self.send_command(command)?;

        let timeout = self.timings.response_timeout;
        let reply = self.collect_fixed(timeout).map_err(Error::at(Cmd::STEP))?;
        trace!("Reply of {:?}: {:?}", Cmd::STEP, reply.as_str());

        Ok(reply)
    }

    /// Sends a command and collects a reply of unpredictable length by the general idle polling
    pub(crate) fn transact_idle<Cmd: AtatCmd + CommandStep>(&mut self, command: &Cmd) -> Result<String, Error> {
        self.send_command(command)?;

        let polling = self.timings.idle;
        let reply = self.collect_idle(polling).map_err(Error::at(Cmd::STEP))?;
        trace!("Reply of {:?}: {:?}", Cmd::STEP, reply.as_str());

        Ok(reply)
    }

    /// Reads all currently available data. Returns the number of bytes read.
    fn drain(&mut self, reply: &mut Vec<u8>) -> Result<usize, ErrorKind> {
        let mut buffer = [0x0; RX_SIZE];
        let mut total = 0;

        loop {
            let length = self
                .transport
                .read_available(&mut buffer)
                .map_err(|error| ErrorKind::Transport(error.kind()))?;

            reply.extend_from_slice(&buffer[..length]);
            total += length;

            if length == 0 || length < RX_SIZE {
                return Ok(total);
            }
        }
    }

    fn decode(reply: Vec<u8>) -> String {
        debug!("Collected {} bytes", reply.len());

        match String::from_utf8(reply) {
            Ok(text) => text,
            Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
        }
    }
}

/// Debug output of command bytes
struct Printable<'a>(&'a [u8]);

impl core::fmt::Debug for Printable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match core::str::from_utf8(self.0) {
            Ok(text) => write!(f, "{:?}", text.trim_end()),
            Err(_) => write!(f, "<{} bytes>", self.0.len()),
        }
    }
}
