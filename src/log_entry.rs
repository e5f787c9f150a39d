use std::fmt;

/// A single row of the tracking history as rendered by the tracker page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Date and time cells joined by a space, exactly as rendered
    date: String,
    location: String,
    message: String,
}

impl LogEntry {
    pub fn new(date: String, location: String, message: String) -> Self {
        Self {
            date,
            location,
            message,
        }
    }

    /// Builds an entry from the cell texts of one table row.
    ///
    /// Cells are read as date, time, location, message. Returns `None` for
    /// rows without cells (headers and decoration). Missing trailing cells
    /// become empty strings.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }

        let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

        Some(Self::new(
            format!("{} {}", cell(0), cell(1)),
            cell(2).to_string(),
            cell(3).to_string(),
        ))
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {} — {}", self.date, self.location, self.message)
    }
}
