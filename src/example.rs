//! Mocks for doc examples
use crate::transport::Transport;
use alloc::collections::VecDeque;
use embedded_io::ErrorKind;
use fugit::{TimerDurationU32, TimerInstantU32};
use fugit_timer::Timer;

/// Serial mock answering the commands of the doc examples
#[derive(Default)]
pub struct ExampleSerial {
    /// Reply bytes not read yet
    pending: VecDeque<u8>,

    /// True once an association command was received
    link_up: bool,
}

impl Transport for ExampleSerial {
    type Error = ErrorKind;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let reply: &[u8] = match data {
            b"AT+WNI=0\r\n" => b"AT+WNI=0\r\n+WNI:0\r\n\r\nOK\r\n",
            b"AT+WNIFCFG\r\n" if self.link_up => b"+WNIFCFG:\r\nwlan0: UP\r\n\r\nOK\r\n",
            b"AT+WNIFCFG\r\n" => b"+WNIFCFG:\r\nwlan0: DOWN\r\n\r\nOK\r\n",
            b"AT+SC=2,1,0\r\n" => b"+SC:1\r\n\r\nOK\r\n",
            b"AT+CGMM\r\n" => b"WE310G4\r\n\r\nOK\r\n",
            b"AT+CGMR\r\n" => b"WE310G4-I 39.00.004\r\n\r\nOK\r\n",
            _ if data.starts_with(b"AT+WNCN=") => {
                self.link_up = true;
                b"\r\nOK\r\n"
            }
            _ if data.starts_with(b"AT+NDNSCRURL=") => b"+NDNSCRURL:,api.thingspeak.com:192.0.2.10\r\n\r\nOK\r\n",
            _ => b"\r\nOK\r\n",
        };

        self.pending.extend(reply.iter());
        Ok(())
    }

    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let length = buffer.len().min(self.pending.len());

        for (target, byte) in buffer.iter_mut().zip(self.pending.drain(..length)) {
            *target = byte;
        }

        Ok(length)
    }
}

/// Timer mock, expires immediately
#[derive(Default)]
pub struct ExampleTimer {}

impl<const TIMER_HZ: u32> Timer<TIMER_HZ> for ExampleTimer {
    type Error = u32;

    fn now(&mut self) -> TimerInstantU32<TIMER_HZ> {
        TimerInstantU32::from_ticks(0)
    }

    fn start(&mut self, _duration: TimerDurationU32<TIMER_HZ>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn wait(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}
