//! Record persistence

use crate::record::Record;

/// Destination for committed records
///
/// A commit replaces whatever the sink held before. Implementations
/// backed by shared storage should make the replacement atomic so a
/// reader never observes a partial record.
pub trait RecordSink {
    /// Error type for commit failures
    type Error: core::fmt::Debug;

    /// Replace the stored record with `record`
    fn commit(&mut self, record: &Record) -> Result<(), Self::Error>;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    type Error = S::Error;

    fn commit(&mut self, record: &Record) -> Result<(), Self::Error> {
        (**self).commit(record)
    }
}
