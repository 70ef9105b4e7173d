//! Example that runs on Linux using a serial-USB-adapter.
use std::{env, io, io::Read, io::Write, time::Duration};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use we310_at::{
    adapter::Adapter,
    config::{Config, Timings},
    connection::run_session,
    transport::Transport,
};

// Chunk size in bytes when reading from the serial port
const RX_SIZE: usize = 256;

// Timer frequency in Hz
const TIMER_HZ: u32 = 1000;

fn main() {
    env_logger::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 && args.len() != 6 {
        println!("Usage: {} <path-to-serial> <baudrate> <ssid> <psk> [host]", args[0]);
        println!("Example: {} /dev/ttyUSB0 115200 mywifi hellopasswd123", args[0]);
        println!("\nNote: To run the example with debug logging, run it like this:");
        println!("\n  RUST_LOG=trace cargo run --example linux -- /dev/ttyUSB0 115200 mywifi hellopasswd123");
        std::process::exit(1);
    }
    let dev = &args[1];
    let baud_rate: u32 = args[2].parse().expect("Invalid baud rate");
    let ssid = &args[3];
    let psk = &args[4];

    let mut config = Config::new(ssid, psk).expect("Invalid WiFi credentials");
    if let Some(host) = args.get(5) {
        config = config.with_host(host).expect("Invalid host name");
    }

    println!("Starting (dev={}, baud={:?})...", dev, baud_rate);

    // Open serial port
    let serial = serialport::new(dev, baud_rate)
        .data_bits(DataBits::Eight)
        .flow_control(FlowControl::None)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .timeout(Duration::from_millis(500))
        .open()
        .expect("Could not open serial port");

    // Data left from previous sessions is discarded by the adapter before every command

    // Module information
    let mut adapter: Adapter<_, _, TIMER_HZ, RX_SIZE> = Adapter::new(HostSerial(serial), timer::SysTimer::new());
    println!("Model: {}", adapter.model().expect("Could not query model"));
    println!(
        "Firmware: {}",
        adapter.firmware_version().expect("Could not query firmware version")
    );
    let (transport, _) = adapter.release();

    // Join WIFI access point, resolve host and open socket
    println!("Connecting to \"{}\" via \"{}\"...", config.host(), config.ssid());
    match run_session::<_, _, TIMER_HZ, RX_SIZE>(transport, timer::SysTimer::new(), Timings::default(), &config) {
        Ok(connection) => {
            println!("Interface handle: {}", connection.handle);
            println!("Resolved {}: {}", config.host(), connection.address);
            println!("Socket CID: {}", connection.socket.cid());
        }
        Err(error) => {
            println!("Connection failed: {}", error);
            std::process::exit(2);
        }
    }
}

/// Serial port of the host system
struct HostSerial(Box<dyn SerialPort>);

impl Transport for HostSerial {
    type Error = io::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write_all(data)?;
        self.0.flush()
    }

    fn read_available(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        let pending = self.0.bytes_to_read()? as usize;
        if pending == 0 || buffer.is_empty() {
            return Ok(0);
        }

        let length = pending.min(buffer.len());
        match self.0.read(&mut buffer[..length]) {
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(0),
            result => result,
        }
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.0.flush()
    }
}

mod timer {
    use std::time::{Duration, Instant};

    use fugit::{TimerDurationU32, TimerInstantU32};
    use fugit_timer::Timer;

    /// Millisecond timer on top of the monotonic system clock
    pub struct SysTimer {
        origin: Instant,
        deadline: Option<Instant>,
    }

    impl SysTimer {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                deadline: None,
            }
        }
    }

    impl Timer<1000> for SysTimer {
        type Error = &'static str;

        /// Milliseconds since creation, wrapping after ~49 days
        fn now(&mut self) -> TimerInstantU32<1000> {
            TimerInstantU32::from_ticks(self.origin.elapsed().as_millis() as u32)
        }

        fn start(&mut self, duration: TimerDurationU32<1000>) -> Result<(), Self::Error> {
            self.deadline = Some(Instant::now() + Duration::from_millis(duration.ticks().into()));
            Ok(())
        }

        fn cancel(&mut self) -> Result<(), Self::Error> {
            self.deadline.take().map(|_| ()).ok_or("timer not running")
        }

        fn wait(&mut self) -> nb::Result<(), Self::Error> {
            match self.deadline {
                None => Err(nb::Error::Other("timer not running")),
                Some(deadline) if Instant::now() >= deadline => Ok(()),
                Some(_) => {
                    std::thread::yield_now();
                    Err(nb::Error::WouldBlock)
                }
            }
        }
    }
}
