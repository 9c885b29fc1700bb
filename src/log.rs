/// One line of the execution log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Final SQL text sent to the driver.
    Statement(String),
    /// Driver diagnostic for the statement before it.
    Error(String),
}

impl LogEntry {
    pub fn text(&self) -> &str {
        match self {
            LogEntry::Statement(s) | LogEntry::Error(s) => s,
        }
    }
}

/// Append-only record of executed statements, kept for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ExecutionLog {
    entries: Vec<LogEntry>,
    exec_times: u64,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_statement(&mut self, sql: &str) {
        self.exec_times += 1;
        self.entries.push(LogEntry::Statement(sql.to_string()));
    }

    pub(crate) fn record_error(&mut self, message: &str) {
        self.entries.push(LogEntry::Error(message.to_string()));
    }

    /// Number of statements sent to the driver.
    pub fn exec_times(&self) -> u64 {
        self.exec_times
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Executed statements only, in order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            LogEntry::Statement(s) => Some(s.as_str()),
            LogEntry::Error(_) => None,
        })
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
