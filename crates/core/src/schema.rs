//! Schema inference
//!
//! Scans the raw rows once and derives, per column, either the ordered list of
//! distinct categorical values or the maximum observed continuous value.
//! Descriptors are immutable once built.

use std::collections::HashSet;
use tracing::debug;

use crate::config::{AttributeKind, AttributeTypes};
use crate::dataset::{check_rectangular, RawRecord};
use crate::errors::{PipelineError, Result};

/// Encoding rule for one column
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeDescriptor {
    /// Distinct values in first-seen order
    Categorical { classes: Vec<String> },
    /// Largest value observed in the column
    Continuous { max_magnitude: f64 },
}

impl AttributeDescriptor {
    /// Number of `input` slots this attribute occupies
    pub fn width(&self) -> usize {
        match self {
            AttributeDescriptor::Categorical { classes } => classes.len(),
            AttributeDescriptor::Continuous { .. } => 1,
        }
    }

    /// Class list, if categorical
    pub fn classes(&self) -> Option<&[String]> {
        match self {
            AttributeDescriptor::Categorical { classes } => Some(classes),
            AttributeDescriptor::Continuous { .. } => None,
        }
    }
}

/// Placement of one non-target column inside the encoded feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpan {
    pub column: usize,
    pub offset: usize,
    pub width: usize,
}

/// Fixed shape of every encoded `input` vector for a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureLayout {
    pub spans: Vec<FeatureSpan>,
    pub width: usize,
}

impl FeatureLayout {
    /// Lay out every non-target column in column order. The target (last)
    /// descriptor contributes nothing.
    pub fn from_descriptors(descriptors: &[AttributeDescriptor]) -> Self {
        let feature_columns = descriptors.len().saturating_sub(1);
        let mut spans = Vec::with_capacity(feature_columns);
        let mut offset = 0;

        for (column, descriptor) in descriptors.iter().take(feature_columns).enumerate() {
            let width = descriptor.width();
            spans.push(FeatureSpan {
                column,
                offset,
                width,
            });
            offset += width;
        }

        Self {
            spans,
            width: offset,
        }
    }
}

/// Descriptors for every column plus the accumulators derived alongside them
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    descriptors: Vec<AttributeDescriptor>,
    max_class_cardinality: usize,
    layout: FeatureLayout,
}

impl Schema {
    /// Build descriptors from `records` according to `types`.
    ///
    /// The result depends only on the rows and their order; calling it twice on
    /// the same data yields equal schemas.
    pub fn infer(records: &[RawRecord], types: &AttributeTypes) -> Result<Self> {
        let column_count = check_rectangular(records)?;
        let kinds = types.resolve(column_count)?;

        let mut descriptors = Vec::with_capacity(column_count);
        let mut max_class_cardinality = 0;

        for (column, kind) in kinds.into_iter().enumerate() {
            let descriptor = match kind {
                AttributeKind::Categorical => {
                    let classes = distinct_values(records, column);
                    max_class_cardinality = max_class_cardinality.max(classes.len());
                    AttributeDescriptor::Categorical { classes }
                }
                AttributeKind::Continuous => AttributeDescriptor::Continuous {
                    max_magnitude: column_maximum(records, column)?,
                },
            };
            debug!(column, ?descriptor, "Inferred attribute");
            descriptors.push(descriptor);
        }

        Ok(Self::from_descriptors(descriptors, max_class_cardinality))
    }

    fn from_descriptors(
        descriptors: Vec<AttributeDescriptor>,
        max_class_cardinality: usize,
    ) -> Self {
        let layout = FeatureLayout::from_descriptors(&descriptors);
        Self {
            descriptors,
            max_class_cardinality,
            layout,
        }
    }

    pub fn descriptors(&self) -> &[AttributeDescriptor] {
        &self.descriptors
    }

    /// Largest class list among categorical columns, target included
    pub fn max_class_cardinality(&self) -> usize {
        self.max_class_cardinality
    }

    pub fn column_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn target_index(&self) -> usize {
        self.descriptors.len() - 1
    }

    /// Class labels of the target column
    pub fn target_classes(&self) -> &[String] {
        self.descriptors[self.target_index()]
            .classes()
            .unwrap_or_default()
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Length of every encoded `input` vector
    pub fn feature_width(&self) -> usize {
        self.layout.width
    }
}

fn distinct_values(records: &[RawRecord], column: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut classes = Vec::new();

    for record in records {
        let value = &record[column];
        if seen.insert(value.as_str()) {
            classes.push(value.clone());
        }
    }

    classes
}

fn column_maximum(records: &[RawRecord], column: usize) -> Result<f64> {
    let mut max = f64::NEG_INFINITY;

    for (row, record) in records.iter().enumerate() {
        let value = parse_continuous(&record[column], row, column)?;
        max = max.max(value);
    }

    Ok(max)
}

/// Parse a continuous cell, rejecting anything that is not a finite number.
pub(crate) fn parse_continuous(raw: &str, row: usize, column: usize) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PipelineError::Parse(format!(
            "row {}, column {}: {:?} is not a finite number",
            row + 1,
            column,
            raw
        ))),
    }
}
