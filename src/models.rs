//! Core data structures for contact export processing.
//!
//! Defines the raw decoded row, the validated contact, the per-file
//! location, the enriched output record and the processing statistics.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Column names assigned positionally to every input record.
///
/// Exports carry a header line whose text does not match these names, so the
/// header is skipped and fields are labelled by position instead.
pub const CONTACT_COLUMNS: [&str; 5] = [
    "email",
    "firstName",
    "lastName",
    "isSubscribed",
    "unsubscribedDate",
];

/// Email value that marks a header line repeated inside the data
pub const RESTATED_HEADER_EMAIL: &str = "Email Address";

/// One decoded input line, before validation.
///
/// A field is `None` when the record had no column at that position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_subscribed: Option<String>,
    pub unsubscribed_date: Option<String>,
}

impl RawRow {
    /// Build a row from positional fields, in `CONTACT_COLUMNS` order
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut fields = fields.into_iter().map(Into::into);
        Self {
            email: fields.next(),
            first_name: fields.next(),
            last_name: fields.next(),
            is_subscribed: fields.next(),
            unsubscribed_date: fields.next(),
        }
    }

    /// True when the row is the export's header line repeated in the data
    pub fn is_restated_header(&self) -> bool {
        self.email.as_deref() == Some(RESTATED_HEADER_EMAIL)
    }
}

/// Subscription flag as it appears in exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubscriptionStatus {
    Yes,
    No,
}

impl SubscriptionStatus {
    pub const ALLOWED: [&'static str; 2] = ["Yes", "No"];

    /// Parse the literal export value. Case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Yes" => Some(SubscriptionStatus::Yes),
            "No" => Some(SubscriptionStatus::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Yes => "Yes",
            SubscriptionStatus::No => "No",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact that passed validation.
///
/// Fields are private: the only way to obtain one is
/// [`crate::validation::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    email: String,
    first_name: String,
    last_name: String,
    is_subscribed: SubscriptionStatus,
    unsubscribed_date: Option<String>,
}

impl ContactRecord {
    pub(crate) fn new(
        email: String,
        first_name: String,
        last_name: String,
        is_subscribed: SubscriptionStatus,
        unsubscribed_date: Option<String>,
    ) -> Self {
        Self {
            email,
            first_name,
            last_name,
            is_subscribed,
            unsubscribed_date,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn is_subscribed(&self) -> SubscriptionStatus {
        self.is_subscribed
    }

    pub fn unsubscribed_date(&self) -> Option<&str> {
        self.unsubscribed_date.as_deref()
    }
}

/// Location tagged onto every record of one export file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub country_code: String,
    pub state_code: String,
    pub city: String,
    pub countries_of_interest: String,
}

impl Location {
    pub fn new(
        country_code: impl Into<String>,
        state_code: impl Into<String>,
        city: impl Into<String>,
        countries_of_interest: impl Into<String>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            state_code: state_code.into(),
            city: city.into(),
            countries_of_interest: countries_of_interest.into(),
        }
    }

    /// True when no keyword matched the file name
    pub fn is_unset(&self) -> bool {
        self.country_code.is_empty()
            && self.state_code.is_empty()
            && self.city.is_empty()
            && self.countries_of_interest.is_empty()
    }
}

/// A subscribed contact merged with its file's location.
///
/// Field order here is the output column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: SubscriptionStatus,
    pub unsubscribed_date: Option<String>,
    pub country_code: String,
    pub state_code: String,
    pub city: String,
    pub countries_of_interest: String,
}

impl OutputRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "email",
        "firstName",
        "lastName",
        "isSubscribed",
        "unsubscribedDate",
        "countryCode",
        "stateCode",
        "city",
        "countriesOfInterest",
    ];

    pub fn enrich(contact: ContactRecord, location: &Location) -> Self {
        Self {
            email: contact.email,
            first_name: contact.first_name,
            last_name: contact.last_name,
            is_subscribed: contact.is_subscribed,
            unsubscribed_date: contact.unsubscribed_date,
            country_code: location.country_code.clone(),
            state_code: location.state_code.clone(),
            city: location.city.clone(),
            countries_of_interest: location.countries_of_interest.clone(),
        }
    }
}

/// Row counters for one processed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
    pub rows_read: usize,
    pub header_rows: usize,
    pub invalid_rows: usize,
    pub unsubscribed_rows: usize,
    pub rows_written: usize,
}

impl FileStats {
    /// Rows dropped for any reason
    pub fn rows_dropped(&self) -> usize {
        self.header_rows + self.invalid_rows + self.unsubscribed_rows
    }

    pub fn merge(&mut self, other: &FileStats) {
        self.rows_read += other.rows_read;
        self.header_rows += other.header_rows;
        self.invalid_rows += other.invalid_rows;
        self.unsubscribed_rows += other.unsubscribed_rows;
        self.rows_written += other.rows_written;
    }
}

/// A file the batch could not process
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Batch processing statistics
#[derive(Debug, Default)]
pub struct BatchStats {
    pub files_processed: usize,
    pub files_failed: usize,
    pub rows: FileStats,
    pub failures: Vec<FileFailure>,
    pub output_dir: PathBuf,
    pub elapsed: Duration,
}

impl BatchStats {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_from_short_record() {
        let row = RawRow::from_fields(["a@x.com", "Ann"]);
        assert_eq!(row.email.as_deref(), Some("a@x.com"));
        assert_eq!(row.first_name.as_deref(), Some("Ann"));
        assert_eq!(row.last_name, None);
        assert_eq!(row.unsubscribed_date, None);
    }

    #[test]
    fn test_restated_header_detection() {
        let header =
            RawRow::from_fields(["Email Address", "First Name", "Last Name", "Subscribed", ""]);
        assert!(header.is_restated_header());

        let lower =
            RawRow::from_fields(["email address", "First Name", "Last Name", "Subscribed", ""]);
        assert!(!lower.is_restated_header());
    }

    #[test]
    fn test_subscription_status_is_case_sensitive() {
        assert_eq!(SubscriptionStatus::parse("Yes"), Some(SubscriptionStatus::Yes));
        assert_eq!(SubscriptionStatus::parse("No"), Some(SubscriptionStatus::No));
        assert_eq!(SubscriptionStatus::parse("yes"), None);
        assert_eq!(SubscriptionStatus::parse("NO"), None);
        assert_eq!(SubscriptionStatus::parse(""), None);
    }

    #[test]
    fn test_enrich_copies_location() {
        let contact = ContactRecord::new(
            "a@x.com".to_string(),
            "Ann".to_string(),
            "Lee".to_string(),
            SubscriptionStatus::Yes,
            None,
        );
        let location = Location::new("DE", "BE", "Berlin", "DE");
        let record = OutputRecord::enrich(contact, &location);

        assert_eq!(record.email, "a@x.com");
        assert_eq!(record.country_code, "DE");
        assert_eq!(record.city, "Berlin");
        assert_eq!(record.unsubscribed_date, None);
    }

    #[test]
    fn test_file_stats_merge() {
        let mut total = FileStats::default();
        let file = FileStats {
            rows_read: 10,
            header_rows: 1,
            invalid_rows: 2,
            unsubscribed_rows: 3,
            rows_written: 4,
        };
        total.merge(&file);
        total.merge(&file);

        assert_eq!(total.rows_read, 20);
        assert_eq!(total.rows_dropped(), 12);
        assert_eq!(total.rows_written, 8);
    }

    #[test]
    fn test_unset_location() {
        assert!(Location::default().is_unset());
        assert!(!Location::new("GB", "", "", "").is_unset());
    }
}
