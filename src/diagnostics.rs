//! # Module diagnostics
//!
//! Soft reset, version queries and certificate management. These commands reuse the transaction
//! primitives and do not change the connection state.
//!
//! ## Example
//!
//! ````
//! # use we310_at::example::{ExampleSerial, ExampleTimer};
//! # use we310_at::adapter::Adapter;
//! #
//! let mut adapter: Adapter<_, _, 1_000, 64> = Adapter::new(ExampleSerial::default(), ExampleTimer::default());
//!
//! assert_eq!("WE310G4", adapter.model().unwrap());
//! assert_eq!("WE310G4-I 39.00.004", adapter.firmware_version().unwrap());
//! ````
use crate::adapter::Adapter;
use crate::commands::{
    certificate_store_header, CertificateListCommand, Command, FirmwareVersionCommand, ModelCommand, SoftResetCommand,
};
use crate::error::{Error, Step};
use crate::responses::{first_information_line, is_ok};
use crate::transport::Transport;
use alloc::string::{String, ToString};
use fugit_timer::Timer;
use log::{debug, info};

impl<T: Transport, C: Timer<TIMER_HZ>, const TIMER_HZ: u32, const RX_SIZE: usize> Adapter<T, C, TIMER_HZ, RX_SIZE> {
    /// Restarts the module and returns the boot messages
    pub fn soft_reset(&mut self) -> Result<String, Error> {
        self.send_command(&SoftResetCommand)?;

        let grace = self.timings.reset_grace;
        let polling = self.timings.reset;
        self.sleep(grace).map_err(Error::at(Step::SoftReset))?;

        let reply = self.collect_idle(polling).map_err(Error::at(Step::SoftReset))?;
        info!("Module restarted");
        Ok(reply)
    }

    /// Returns the firmware version
    pub fn firmware_version(&mut self) -> Result<String, Error> {
        let reply = self.transact(&FirmwareVersionCommand)?;
        first_information_line(&reply)
            .map(ToString::to_string)
            .ok_or(Error::parse(Step::FirmwareVersion))
    }

    /// Returns the module model
    pub fn model(&mut self) -> Result<String, Error> {
        let reply = self.transact(&ModelCommand)?;
        first_information_line(&reply)
            .map(ToString::to_string)
            .ok_or(Error::parse(Step::ModelInfo))
    }

    /// Returns the raw certificate list. The list length varies with the number of stored
    /// certificates, so the reply is collected by idle polling.
    pub fn certificate_list(&mut self) -> Result<String, Error> {
        self.transact_idle(&CertificateListCommand::new())
    }

    /// Stores a PEM encoded CA certificate under the given name.
    /// Fails with a parse error if the modem did not confirm the upload with `OK`.
    pub fn store_certificate(&mut self, name: &str, pem: &str) -> Result<String, Error> {
        let on_error = Error::at(Step::CertificateStore);
        debug!("Uploading certificate \"{}\" ({} bytes)", name, pem.len());

        let settle = self.timings.certificate_settle;
        self.send(&certificate_store_header(name, pem.len()), settle)
            .map_err(&on_error)?;

        let settle = self.timings.settle;
        self.send(&Command::payload(pem.as_bytes()), settle)
            .map_err(&on_error)?;

        let polling = self.timings.certificate;
        let reply = self.collect_idle(polling).map_err(&on_error)?;

        if !is_ok(&reply) {
            return Err(Error::parse(Step::CertificateStore));
        }

        info!("Stored certificate \"{}\"", name);
        Ok(reply)
    }
}
