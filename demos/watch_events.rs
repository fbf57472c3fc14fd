//! Line Event Watcher
//!
//! Polls one input line and reports every raw state change with the time
//! elapsed since the watch started. Collected events are dumped as JSON on
//! exit so they can be aligned with experiment logs.
//!
//! Usage:
//!   cargo run --example watch_events -- /dev/ttyUSB0
//!   cargo run --example watch_events -- /dev/ttyUSB0 --line 2 --baud 115200
//!
//! Ctrl-C stops the watch, closes the port and exits non-zero.

use dlp_io8_protocol::{DlpError, DlpIo8, LineEvent, LineWatcher, PortConfig, Result};
use log::info;

fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let port_name = match args.first() {
        Some(a) if !a.starts_with("--") => a.clone(),
        _ => {
            eprintln!("usage: watch_events <port> [--line N] [--baud RATE]");
            std::process::exit(2);
        }
    };
    let line: u8 = flag_value(&args, "--line").unwrap_or(1);
    let baud = flag_value(&args, "--baud").unwrap_or(PortConfig::default().baud_rate);

    let mut dlp = DlpIo8::open(&port_name, baud)?;

    let token = dlp.cancel_token();
    ctrlc::set_handler(move || token.cancel()).expect("failed to install Ctrl-C handler");

    let mut watcher = LineWatcher::new(line)?;
    let mut events: Vec<LineEvent> = Vec::new();

    info!("Watching line {} on {} (Ctrl-C to stop)", line, port_name);
    loop {
        match watcher.poll(&mut dlp) {
            Ok(Some(event)) => {
                println!(
                    "{}ms: line {} = 0x{:02X}",
                    event.elapsed_ms, event.line, event.raw
                );
                events.push(event);
            }
            Ok(None) => {}
            Err(DlpError::Cancelled) => break,
            Err(e) => {
                dlp.close();
                return Err(e);
            }
        }
    }

    dlp.close();
    eprintln!("\ninterrupt received: {} closed", port_name);
    println!(
        "{}",
        serde_json::to_string_pretty(&events).expect("failed to serialize events")
    );
    std::process::exit(1);
}
