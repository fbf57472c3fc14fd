//! Line Check Demo
//!
//! Exercises the 8 digital lines of a DLP-IO8-G: either toggles all of them
//! ON/OFF once per second (send test) or polls their states once per second
//! (receive test), printing elapsed milliseconds with every step.
//!
//! Usage:
//!   cargo run --example check_lines -- --list
//!   cargo run --example check_lines                          # Interactive port selection
//!   cargo run --example check_lines -- /dev/ttyUSB0
//!   cargo run --example check_lines -- /dev/ttyUSB0 --send --loops 30
//!   cargo run --example check_lines -- /dev/ttyUSB0 --baud 115200
//!
//! Ctrl-C cancels the current operation, closes the port and exits non-zero.
//!
//! Set RUST_LOG to control logging:
//!   RUST_LOG=trace cargo run --example check_lines -- /dev/ttyUSB0

use dlp_io8_protocol::{CancelToken, DlpError, DlpIo8, PortConfig, Result};
use inquire::Select;
use log::info;
use std::time::{Duration, Instant};

/// Interactive serial port selection using inquire
fn select_port() -> Result<String> {
    let ports = DlpIo8::list_ports()?;

    if ports.is_empty() {
        eprintln!("No serial ports found!");
        std::process::exit(1);
    }

    let port_names: Vec<String> = ports
        .iter()
        .map(|p| format!("{} - {:?}", p.port_name, p.port_type))
        .collect();

    let selection = Select::new("Select a serial port:", port_names)
        .prompt()
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Selection cancelled: {}", e),
            )
        })?;

    // Extract just the port name (before " - ")
    let port_name = selection.split(" - ").next().unwrap().to_string();
    Ok(port_name)
}

fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn elapsed_ms(start: Instant) -> u128 {
    start.elapsed().as_millis()
}

/// Toggle all 8 lines OFF/ON once per second.
fn send_test(dlp: &mut DlpIo8, token: &CancelToken, nloops: u32, start: Instant) -> Result<()> {
    for _ in 0..nloops {
        if token.is_cancelled() {
            return Err(DlpError::Cancelled);
        }

        dlp.unset_lines("12345678")?;
        println!("OFF {}ms", elapsed_ms(start));
        std::thread::sleep(Duration::from_secs(1));

        dlp.set_lines("12345678")?;
        println!("ON {}ms", elapsed_ms(start));
        std::thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}

/// Poll all 8 lines once per second.
fn receive_test(dlp: &mut DlpIo8, token: &CancelToken, nloops: u32, start: Instant) -> Result<()> {
    for _ in 0..nloops {
        if token.is_cancelled() {
            return Err(DlpError::Cancelled);
        }

        let states = dlp.read_lines()?;
        println!(
            "{}ms: {:02X?} ({} bytes returned)",
            elapsed_ms(start),
            states,
            states.len()
        );
        std::thread::sleep(Duration::from_secs(1));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--list") {
        for port in DlpIo8::list_ports()? {
            println!("Found port: {}", port.port_name);
        }
        return Ok(());
    }

    let port_name = match args.first() {
        Some(a) if !a.starts_with("--") => a.clone(),
        _ => select_port()?,
    };
    let baud = flag_value(&args, "--baud").unwrap_or(PortConfig::default().baud_rate);
    let nloops = flag_value(&args, "--loops").unwrap_or(30);
    let send_mode = args.iter().any(|a| a == "--send");

    info!("Connecting to DLP-IO8-G on {}...", port_name);
    let mut dlp = DlpIo8::open(&port_name, baud)?;

    let token = dlp.cancel_token();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel()).expect("failed to install Ctrl-C handler");

    let start = Instant::now();
    let outcome = if send_mode {
        info!("Sending on {}", port_name);
        send_test(&mut dlp, &token, nloops, start)
    } else {
        info!("Receiving on {}", port_name);
        receive_test(&mut dlp, &token, nloops, start)
    };

    match outcome {
        Err(DlpError::Cancelled) => {
            dlp.close();
            eprintln!("\ninterrupt received: {} closed", port_name);
            std::process::exit(1);
        }
        other => other?,
    }

    dlp.close();
    Ok(())
}
