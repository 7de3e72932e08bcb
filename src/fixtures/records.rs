//! Record Fixtures

use serde::Deserialize;

use crate::records::DiscountRecord;

/// Wrapper for discount records in YAML
///
/// Records deserialize through the same validated wire shape as the client
/// store, so a fixture with a tampered percent or inverted expiry fails to
/// load just like a tampered store would.
#[derive(Debug, Deserialize)]
pub struct RecordsFixture {
    /// Vector of discount records
    pub records: Vec<DiscountRecord>,
}
