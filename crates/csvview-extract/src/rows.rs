//! Lazy row extraction

use crate::error::ExtractError;
use crate::selector::ExtractionSpec;
use csvview_record::{Cell, FlatRow, Value};
use std::iter::FusedIterator;

/// Extract flat rows from records
///
/// The records are pulled one per call to `next`, in order. With `spec`
/// absent every record must be a list of scalars or a mapping of scalars,
/// whose values are written in key order.
pub fn extract<I>(records: I, spec: Option<&ExtractionSpec>) -> Rows<I::IntoIter>
where
    I: IntoIterator<Item = Value>,
{
    Rows {
        records: records.into_iter(),
        spec: spec.cloned(),
        index: 0,
        failed: false,
    }
}

/// Iterator of extracted rows
///
/// Stops after the first error.
#[derive(Debug)]
pub struct Rows<I> {
    records: I,
    spec: Option<ExtractionSpec>,
    index: usize,
    failed: bool,
}

impl<I> Rows<I> {
    /// Records consumed so far
    #[inline]
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.index
    }

    /// Number of cells per row, if fixed by a spec
    #[inline]
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.spec.as_ref().map(ExtractionSpec::len)
    }
}

impl<I> Iterator for Rows<I>
where
    I: Iterator<Item = Value>,
{
    type Item = Result<FlatRow, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let record = self.records.next()?;
        let index = self.index;
        self.index += 1;

        let row = match &self.spec {
            Some(spec) => spec.row(&record, index),
            None => passthrough(record, index),
        };
        if let Err(e) = &row {
            tracing::debug!("Extraction stopped at record {}: {}", index, e);
            self.failed = true;
        }
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            self.records.size_hint()
        }
    }
}

impl<I> FusedIterator for Rows<I> where I: Iterator<Item = Value> {}

fn passthrough(record: Value, index: usize) -> Result<FlatRow, ExtractError> {
    let items: Vec<Value> = match record {
        Value::List(items) => items,
        Value::Map(entries) => entries.into_values().collect(),
        other => {
            return Err(ExtractError::data_shape(
                index,
                format!("record is {}, expected a list or map", other.kind()),
            ));
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(column, item)| {
            Cell::try_from(item)
                .map_err(|e| ExtractError::data_shape(index, format!("column {column}: {e}")))
        })
        .collect()
}
