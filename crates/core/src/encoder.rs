//! Record encoding
//!
//! Turns one raw row into a numeric feature vector plus an integer class label:
//! categorical features become one-hot blocks, continuous features are scaled
//! by the column maximum, and the target column becomes an index into its
//! class list. The target never contributes to `input`.
//!
//! An older scalar normalization, `value / (1.2 * max) + 0.001` with a
//! thresholding "denormalize" inverse, was never wired into the pipeline and
//! is intentionally not provided here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::UnseenCategoryPolicy;
use crate::dataset::RawRecord;
use crate::errors::{PipelineError, Result};
use crate::schema::{parse_continuous, AttributeDescriptor, Schema};

/// Numeric form of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedRecord {
    /// Concatenated per-attribute encodings of every non-target column
    pub input: Vec<f64>,
    /// Index into the target column's class list
    pub output: usize,
}

/// Encodes rows against a fixed schema.
pub struct RecordEncoder<'a> {
    schema: &'a Schema,
    lookups: Vec<Option<HashMap<&'a str, usize>>>,
    unseen: UnseenCategoryPolicy,
}

impl<'a> RecordEncoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        let lookups = schema
            .descriptors()
            .iter()
            .map(|descriptor| {
                descriptor.classes().map(|classes| {
                    classes
                        .iter()
                        .enumerate()
                        .map(|(idx, class)| (class.as_str(), idx))
                        .collect()
                })
            })
            .collect();

        Self {
            schema,
            lookups,
            unseen: UnseenCategoryPolicy::default(),
        }
    }

    /// Policy for feature values missing from their class list. The target
    /// column always rejects them.
    pub fn with_unseen_policy(mut self, policy: UnseenCategoryPolicy) -> Self {
        self.unseen = policy;
        self
    }

    /// Encode a single row. Errors refer to it as row 1.
    pub fn encode(&self, record: &RawRecord) -> Result<EncodedRecord> {
        self.encode_row(0, record)
    }

    /// Encode every row, stopping at the first failure.
    pub fn encode_all(&self, records: &[RawRecord]) -> Result<Vec<EncodedRecord>> {
        records
            .iter()
            .enumerate()
            .map(|(row, record)| self.encode_row(row, record))
            .collect()
    }

    fn encode_row(&self, row: usize, record: &RawRecord) -> Result<EncodedRecord> {
        let column_count = self.schema.column_count();
        if record.len() != column_count {
            return Err(PipelineError::Parse(format!(
                "row {}: expected {} fields, got {}",
                row + 1,
                column_count,
                record.len()
            )));
        }

        let target = self.schema.target_index();
        let mut input = Vec::with_capacity(self.schema.feature_width());

        for (column, descriptor) in self.schema.descriptors().iter().enumerate().take(target) {
            let value = &record[column];
            match descriptor {
                AttributeDescriptor::Categorical { classes } => {
                    let block_start = input.len();
                    input.resize(block_start + classes.len(), 0.0);
                    match self.class_index(column, value) {
                        Some(idx) => input[block_start + idx] = 1.0,
                        None if self.unseen == UnseenCategoryPolicy::ZeroVector => {}
                        None => {
                            return Err(PipelineError::UnknownCategory {
                                column,
                                value: value.clone(),
                            })
                        }
                    }
                }
                AttributeDescriptor::Continuous { max_magnitude } => {
                    if *max_magnitude == 0.0 {
                        return Err(PipelineError::DegenerateScale { column });
                    }
                    let parsed = parse_continuous(value, row, column)?;
                    input.push(parsed / max_magnitude);
                }
            }
        }

        let output = self.class_index(target, &record[target]).ok_or_else(|| {
            PipelineError::UnknownCategory {
                column: target,
                value: record[target].clone(),
            }
        })?;

        check_width(row, input.len(), self.schema.feature_width())?;

        Ok(EncodedRecord { input, output })
    }

    fn class_index(&self, column: usize, value: &str) -> Option<usize> {
        self.lookups[column]
            .as_ref()
            .and_then(|lookup| lookup.get(value).copied())
    }
}

/// `row` is 0-based; the error reports it 1-based like every other row error.
fn check_width(row: usize, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(PipelineError::WidthMismatch {
            record: row + 1,
            got,
            expected,
        });
    }
    Ok(())
}
