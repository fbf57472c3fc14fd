//! Square Wave Generator
//!
//! Generates a square wave on line 1 (1 s high, 4 s low) while polling
//! line 2 for external events between the edges, then reports the actual
//! pulse onsets and every change seen on line 2.
//!
//! Usage:
//!   cargo run --example square_wave -- /dev/ttyUSB0
//!   cargo run --example square_wave -- /dev/ttyUSB0 --periods 10

use dlp_io8_protocol::{DlpIo8, LineEvent, LineWatcher, Result};
use std::io::Write;
use std::time::{Duration, Instant};

/// Pulse width
const TIME_HIGH: Duration = Duration::from_millis(1000);
/// Gap between pulses
const TIME_LOW: Duration = Duration::from_millis(4000);

fn poll_line2(
    watcher: &mut LineWatcher,
    dlp: &mut DlpIo8,
    events: &mut Vec<LineEvent>,
) -> Result<()> {
    if let Some(event) = watcher.poll(dlp)? {
        println!("{}ms: line 2 = 0x{:02X}", event.elapsed_ms, event.raw);
        events.push(event);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let port_name = match args.first() {
        Some(a) if !a.starts_with("--") => a.clone(),
        _ => {
            eprintln!("usage: square_wave <port> [--periods N]");
            std::process::exit(2);
        }
    };
    let periods: u32 = args
        .iter()
        .position(|a| a == "--periods")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let mut dlp = DlpIo8::open(&port_name, 115_200)?;

    let period = TIME_HIGH + TIME_LOW;
    let mut watcher = LineWatcher::new(2)?;
    let mut onsets: Vec<u128> = Vec::new();
    let mut events: Vec<LineEvent> = Vec::new();

    let start = Instant::now();
    for i in 0..periods {
        // poll line 2 until the start of the next period
        let onset = period * i;
        while start.elapsed() < onset {
            poll_line2(&mut watcher, &mut dlp, &mut events)?;
        }

        onsets.push(start.elapsed().as_millis());
        dlp.set_lines("1")?;

        let high_until = onset + TIME_HIGH;
        while start.elapsed() < high_until {
            poll_line2(&mut watcher, &mut dlp, &mut events)?;
        }

        dlp.unset_lines("1")?;
        print!("\r{:4}", i + 1);
        let _ = std::io::stdout().flush();
    }

    std::thread::sleep(TIME_LOW);
    println!("\r{} periods of {:?}", periods, period);
    println!("Total time elapsed: {:?}", start.elapsed());

    println!("Actual onsets (ms): {:?}", onsets);
    let event_times: Vec<u64> = events.iter().map(|e| e.elapsed_ms).collect();
    println!("Change events on line 2 (ms): {:?}", event_times);

    dlp.close();
    Ok(())
}
