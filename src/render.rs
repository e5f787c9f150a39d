use crate::log_entry::LogEntry;
use chrono::{DateTime, Local};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};
use std::time::Duration;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clears the terminal and prints the current snapshot.
pub fn render<W: Write>(
    out: &mut W,
    url: &str,
    entries: &[LogEntry],
    refreshed_at: DateTime<Local>,
    interval: Duration,
) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    write_snapshot(out, url, entries, refreshed_at, interval)?;
    out.flush()
}

fn write_snapshot<W: Write>(
    out: &mut W,
    url: &str,
    entries: &[LogEntry],
    refreshed_at: DateTime<Local>,
    interval: Duration,
) -> io::Result<()> {
    let next_refresh = chrono::Duration::from_std(interval)
        .ok()
        .and_then(|delta| refreshed_at.checked_add_signed(delta));

    writeln!(out, "URL: {}\n", url)?;
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    writeln!(out)?;
    writeln!(out, "Last refresh at: {}", refreshed_at.format(TIME_FORMAT))?;
    match next_refresh {
        Some(next) => writeln!(out, "Next refresh at {}", next.format(TIME_FORMAT)),
        None => writeln!(out, "Next refresh at unknown"),
    }
}
