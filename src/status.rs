// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use fp_data::LoadReport;

const MAX_MESSAGES: usize = 50;

/// Status message with timestamp
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub timestamp: DateTime<Utc>,
    pub level: StatusLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Bounded, in-app log of what the dashboard has done
#[derive(Debug, Clone)]
pub struct StatusLog {
    messages: VecDeque<StatusMessage>,
    max_messages: usize,
    /// Summary of the most recent successful load
    pub last_report: Option<LoadReport>,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_MESSAGES)
    }

    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages: max_messages.max(1),
            last_report: None,
            last_loaded_at: None,
        }
    }

    /// Add a message, dropping the oldest once the log is full
    pub fn push(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.messages.push_back(StatusMessage {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        });

        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(StatusLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(StatusLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(StatusLevel::Error, message);
    }

    /// Record a successful load, with warnings for rows that were set aside
    pub fn record_load(&mut self, source: &str, report: LoadReport) {
        self.info(format!(
            "Loaded {} false-positive airports from {source}",
            report.subset_rows - report.dropped_confidence
        ));
        if report.dropped_confidence > 0 {
            self.warn(format!("{} rows without a usable confidence", report.dropped_confidence));
        }
        if report.missing_position > 0 {
            self.warn(format!("{} airports without coordinates", report.missing_position));
        }
        self.last_report = Some(report);
        self.last_loaded_at = Some(Utc::now());
    }

    /// Newest first
    pub fn iter_newest(&self) -> impl Iterator<Item = &StatusMessage> {
        self.messages.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|m| m.level == StatusLevel::Error).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let mut log = StatusLog::with_capacity(3);
        for i in 0..5 {
            log.info(format!("message {i}"));
        }
        assert_eq!(log.len(), 3);
        let newest: Vec<&str> = log.iter_newest().map(|m| m.message.as_str()).collect();
        assert_eq!(newest, ["message 4", "message 3", "message 2"]);
    }

    #[test]
    fn test_record_load_warnings() {
        let mut log = StatusLog::new();
        log.record_load(
            "results.csv",
            LoadReport {
                source_rows: 10,
                subset_rows: 6,
                dropped_confidence: 1,
                missing_position: 2,
            },
        );

        let levels: Vec<StatusLevel> = log.iter_newest().map(|m| m.level).collect();
        assert_eq!(levels, [StatusLevel::Warning, StatusLevel::Warning, StatusLevel::Info]);
        assert!(log
            .iter_newest()
            .any(|m| m.message == "Loaded 5 false-positive airports from results.csv"));
        assert!(log.last_report.is_some());
        assert_eq!(log.error_count(), 0);
    }

    #[test]
    fn test_error_count() {
        let mut log = StatusLog::new();
        log.error("missing columns: ['IATA']");
        log.warn("tile failed");
        assert_eq!(log.error_count(), 1);
        assert!(!log.is_empty());
    }
}
