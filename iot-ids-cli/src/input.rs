//! Interactive commands read from stdin
//!
//! Each line becomes one [`Command`] pushed into the driver's channel, so
//! manual refreshes queue up behind timer ticks instead of racing them.

use anyhow::{anyhow, bail, Result};
use iot_ids_core::Command;
use std::io::BufRead;
use std::sync::mpsc::Sender;

pub const HELP: &str = "Commands: r | refresh, t <value> | threshold <value>, \
i <secs> | interval <secs>, auto on|off, q | quit";

/// Parse one line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    if parts.next().is_some() {
        bail!("Too many arguments in {:?}", line.trim());
    }

    let command = match (word.to_lowercase().as_str(), arg) {
        ("r" | "refresh", None) => Command::Refresh,
        ("t" | "threshold", Some(value)) => Command::SetThreshold(parse_number("Threshold", value)?),
        ("i" | "interval", Some(value)) => Command::SetInterval(parse_number("Interval", value)?),
        ("auto", Some("on")) => Command::SetAutoRefresh(true),
        ("auto", Some("off")) => Command::SetAutoRefresh(false),
        ("q" | "quit", None) => Command::Quit,
        _ => bail!("Unknown command {:?}", line.trim()),
    };

    Ok(Some(command))
}

fn parse_number(what: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| anyhow!("{} must be a number, got {:?}", what, value))
}

/// Forward commands from `reader` until quit, end of input, or the driver
/// goes away. `Quit` is forwarded so the driver stops too; on end of input
/// the sender is just dropped and the timer keeps running.
pub fn forward_commands<R: BufRead>(reader: R, commands: Sender<Command>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                return;
            }
        };

        match parse_line(&line) {
            Ok(Some(command)) => {
                log::debug!("Queued {:?}", command);
                if commands.send(command).is_err() || command == Command::Quit {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("{}", HELP);
            }
        }
    }

    log::debug!("Input closed");
}
