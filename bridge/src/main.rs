//! Forwards control lines from the board's serial port to FlightGear.
//!
//! The board emits one `elevator\taileron\trudder` line every 50 ms; this
//! tool reassembles the lines from the raw serial chunks, validates them
//! and passes them on to a FlightGear generic-protocol TCP socket and/or
//! stdout.

use clap::Parser;
use std::io::{self, Write};
use std::net::TcpStream;
use std::time::Duration;

struct ConnectionManager {
    flightgear: Option<TcpStream>,
    echo: bool,
}

impl ConnectionManager {
    fn new(args: &Args) -> io::Result<Self> {
        let flightgear = if args.flightgear {
            Some(connect_to_service(&args.host, args.fg_port, "FlightGear")?)
        } else {
            None
        };

        Ok(Self {
            flightgear,
            echo: args.echo,
        })
    }

    fn forward_line(&mut self, line: &str) -> io::Result<()> {
        if let Some(stream) = &mut self.flightgear {
            stream.write_all(line.as_bytes())?;
            stream.write_all(b"\r\n")?;
        }
        if self.echo {
            print!("Controls: {}\r", line);
            io::stdout().flush()?;
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: String,

    #[arg(long, default_value_t = 57600)]
    baud: u32,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Forward to a FlightGear generic-protocol TCP input
    #[arg(long)]
    flightgear: bool,

    /// Print each control line to stdout
    #[arg(long)]
    echo: bool,

    #[arg(long, default_value_t = 5500)]
    fg_port: u16,
}

fn validate_configuration(args: &Args) -> Result<(), &'static str> {
    if !args.flightgear && !args.echo {
        return Err("At least one of --flightgear or --echo must be specified");
    }
    Ok(())
}

fn setup_serial_port(args: &Args) -> serialport::Result<Box<dyn serialport::SerialPort>> {
    let port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(10))
        .open()?;

    println!("Connected to board on {}", args.port);
    Ok(port)
}

fn connect_to_service(host: &str, port: u16, service_name: &str) -> io::Result<TcpStream> {
    let addr = format!("{}:{}", host, port);
    println!("Attempting to connect to {} at {}", service_name, addr);

    loop {
        match TcpStream::connect(&addr) {
            Ok(stream) => {
                println!("Connected to {} at {}", service_name, addr);
                return Ok(stream);
            }
            Err(e) => {
                println!("Waiting for {}... ({})", service_name, e);
                std::thread::sleep(Duration::from_secs(3));
            }
        }
    }
}

/// Parse one control line: exactly three tab-separated finite floats, each
/// within the [-1.0, 1.0] command range.
fn parse_controls(line: &str) -> Option<(f32, f32, f32)> {
    let mut fields = line.split('\t');
    let elevator: f32 = fields.next()?.trim().parse().ok()?;
    let aileron: f32 = fields.next()?.trim().parse().ok()?;
    let rudder: f32 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    for value in [elevator, aileron, rudder] {
        if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
            return None;
        }
    }
    Some((elevator, aileron, rudder))
}

fn process_control_line(line: &str, connections: &mut ConnectionManager) -> io::Result<()> {
    if parse_controls(line).is_some() {
        connections.forward_line(line)?;
    } else {
        println!("Malformed control line: {}", line);
    }
    Ok(())
}

fn handle_serial_data(data: &[u8], message: &mut String) -> Option<String> {
    message.push_str(&String::from_utf8_lossy(data));

    if let Some(pos) = message.find('\n') {
        let line = message[..pos].trim().to_string();
        *message = message[pos + 1..].to_string();
        Some(line)
    } else {
        None
    }
}

fn run_data_processing(
    mut port: Box<dyn serialport::SerialPort>,
    mut connections: ConnectionManager,
) -> io::Result<()> {
    let mut serial_buf: Vec<u8> = vec![0; 1000];
    let mut message = String::new();

    println!("Starting data forwarding...");
    println!("Press Ctrl+C to exit");

    loop {
        match port.read(serial_buf.as_mut_slice()) {
            Ok(t) => {
                if let Some(line) = handle_serial_data(&serial_buf[..t], &mut message) {
                    process_control_line(&line, &mut connections)?;
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => (),
            Err(e) => {
                eprintln!("Error: {}", e);
                break;
            }
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Err(e) = validate_configuration(&args) {
        eprintln!("Error: {}", e);
        return Ok(());
    }

    let port = setup_serial_port(&args).expect("Failed to open serial port");

    let connections = ConnectionManager::new(&args)?;

    run_data_processing(port, connections)
}
