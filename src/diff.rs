use crate::log_entry::LogEntry;

/// Entries of `current` that do not appear anywhere in `prior`.
///
/// Membership is structural and position-independent. Order follows
/// `current`, and duplicates in `current` are each checked on their own.
pub fn added_entries(prior: &[LogEntry], current: &[LogEntry]) -> Vec<LogEntry> {
    current
        .iter()
        .filter(|entry| !prior.contains(entry))
        .cloned()
        .collect()
}
