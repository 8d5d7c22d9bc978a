//! Per-row subscription filter and location enrichment
//!
//! Every decoded row lands in exactly one bucket: restated header, invalid,
//! unsubscribed, or accepted. Only accepted rows produce output. Nothing in
//! here fails; anomalies are logged and the row is dropped.

use crate::models::{
    ContactRecord, FileStats, Location, OutputRecord, RawRow, SubscriptionStatus,
};
use crate::validation::{ValidationFailure, validate};
use tracing::{debug, warn};

/// Classification of one input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The export's header line repeated inside the data
    HeaderRow,
    Invalid {
        failure: ValidationFailure,
        row: RawRow,
    },
    Unsubscribed(ContactRecord),
    Accepted(OutputRecord),
}

/// Classify a row against a file's location. Pure; no logging.
pub fn classify(row: RawRow, location: &Location) -> RowOutcome {
    if row.is_restated_header() {
        return RowOutcome::HeaderRow;
    }

    match validate(&row) {
        Err(failure) => RowOutcome::Invalid { failure, row },
        Ok(contact) => match contact.is_subscribed() {
            SubscriptionStatus::No => RowOutcome::Unsubscribed(contact),
            SubscriptionStatus::Yes => {
                RowOutcome::Accepted(OutputRecord::enrich(contact, location))
            }
        },
    }
}

/// Stateful filter for one file: classifies, logs and counts rows
#[derive(Debug)]
pub struct ContactFilter {
    file_name: String,
    location: Location,
    stats: FileStats,
}

impl ContactFilter {
    pub fn new(file_name: impl Into<String>, location: Location) -> Self {
        Self {
            file_name: file_name.into(),
            location,
            stats: FileStats::default(),
        }
    }

    /// Run one row through the filter, returning the record to write if any
    pub fn apply(&mut self, row: RawRow) -> Option<OutputRecord> {
        self.stats.rows_read += 1;
        let line = self.stats.rows_read;

        match classify(row, &self.location) {
            RowOutcome::HeaderRow => {
                self.stats.header_rows += 1;
                None
            }
            RowOutcome::Invalid { failure, row } => {
                self.stats.invalid_rows += 1;
                warn!(
                    file = %self.file_name,
                    row_number = line,
                    fields = ?failure.fields(),
                    failure = %failure,
                    row = ?row,
                    "Dropping invalid contact row"
                );
                None
            }
            RowOutcome::Unsubscribed(contact) => {
                self.stats.unsubscribed_rows += 1;
                debug!(
                    file = %self.file_name,
                    row_number = line,
                    contact = ?contact,
                    "Skipping unsubscribed contact"
                );
                None
            }
            RowOutcome::Accepted(record) => {
                self.stats.rows_written += 1;
                Some(record)
            }
        }
    }

    /// Lazily filter a stream of decoded rows, preserving order.
    ///
    /// Decode errors pass through untouched so the caller can abort.
    pub fn filter_rows<'a, I, E>(
        &'a mut self,
        rows: I,
    ) -> impl Iterator<Item = Result<OutputRecord, E>> + 'a
    where
        I: IntoIterator<Item = Result<RawRow, E>>,
        I::IntoIter: 'a,
        E: 'a,
    {
        rows.into_iter().filter_map(move |row| match row {
            Ok(row) => self.apply(row).map(Ok),
            Err(e) => Some(Err(e)),
        })
    }

    pub fn stats(&self) -> &FileStats {
        &self.stats
    }

    pub fn into_stats(self) -> FileStats {
        self.stats
    }
}
