//! Combat log sink for presentation messages.
//!
//! The combat log is the gameplay-facing record of what happened during a
//! round ("Orc takes 12 damage"). It is separate from `tracing`, which is
//! for operators. The host plugs in any [`CombatLog`]; the pipeline wraps it
//! in a [`LogSink`] so an absent log costs nothing and never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category tag attached to every log entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogCategory {
    /// General information (action announcements, retargets).
    Info,
    /// Regular damage.
    Damage,
    /// Critical damage.
    Critical,
    /// An attack that missed.
    Miss,
    /// A combatant was defeated.
    Death,
    /// Health restored.
    Heal,
    /// Action points gained or spent.
    ActionPoints,
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Damage => "damage",
            Self::Critical => "critical",
            Self::Miss => "miss",
            Self::Death => "death",
            Self::Heal => "heal",
            Self::ActionPoints => "ap",
        };
        f.write_str(label)
    }
}

/// Destination for combat log entries.
pub trait CombatLog {
    /// Records one message.
    fn record(&mut self, category: LogCategory, message: &str);
}

/// One recorded entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Category tag.
    pub category: LogCategory,
    /// Presentation text.
    pub message: String,
}

/// In-memory log, handy for tests and headless drivers.
///
/// # Example
///
/// ```
/// use skirmish_core::log::{CombatLog, LogCategory, MemoryLog};
///
/// let mut log = MemoryLog::new();
/// log.record(LogCategory::Damage, "Orc takes 10 damage");
/// log.record(LogCategory::Death, "Orc is defeated");
///
/// assert_eq!(log.count(LogCategory::Death), 1);
/// assert_eq!(log.drain().len(), 2);
/// assert!(log.entries().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Vec<LogEntry>,
}

impl MemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries recorded so far.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries of one category.
    pub fn by_category(&self, category: LogCategory) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Number of entries of one category.
    #[must_use]
    pub fn count(&self, category: LogCategory) -> usize {
        self.by_category(category).count()
    }

    /// Removes and returns every entry.
    pub fn drain(&mut self) -> Vec<LogEntry> {
        std::mem::take(&mut self.entries)
    }
}

impl CombatLog for MemoryLog {
    fn record(&mut self, category: LogCategory, message: &str) {
        self.entries.push(LogEntry {
            category,
            message: message.to_owned(),
        });
    }
}

/// Log that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl CombatLog for NullLog {
    fn record(&mut self, _category: LogCategory, _message: &str) {}
}

/// Optional log handle threaded through the pipeline.
pub struct LogSink<'a> {
    inner: Option<&'a mut dyn CombatLog>,
}

impl fmt::Debug for LogSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogSink")
            .field("attached", &self.inner.is_some())
            .finish()
    }
}

impl<'a> LogSink<'a> {
    /// Wraps an optional host log.
    #[must_use]
    pub fn new(inner: Option<&'a mut dyn CombatLog>) -> Self {
        Self { inner }
    }

    /// A sink that discards everything.
    #[must_use]
    pub fn none() -> Self {
        Self { inner: None }
    }

    /// Returns `true` if a host log is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.is_some()
    }

    /// Records a message if a log is attached.
    pub fn record(&mut self, category: LogCategory, message: impl AsRef<str>) {
        if let Some(log) = self.inner.as_deref_mut() {
            log.record(category, message.as_ref());
        }
    }
}
