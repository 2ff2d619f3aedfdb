//! Delimited-text dataset loading
//!
//! Reads a header-prefixed CSV table into positional string rows. Column order
//! is preserved from the source and the last column is the prediction target.

use std::path::Path;

use crate::errors::{PipelineError, Result};

/// One raw row: ordered string fields, one per column.
pub type RawRecord = Vec<String>;

/// Header plus positional rows as read from the source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Read and parse a CSV file. The read is the pipeline's only suspension point.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Reading dataset file {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse CSV text with a header row. Empty lines are skipped and every
    /// record must carry as many fields as the header.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, records })
    }

    /// Number of columns declared by the header
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the header and hand over the positional value sequences.
    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }
}

/// Verify every row has the same field count as the first one.
pub(crate) fn check_rectangular(records: &[RawRecord]) -> Result<usize> {
    let first = records.first().ok_or(PipelineError::EmptyDataset)?;
    let width = first.len();
    if width == 0 {
        return Err(PipelineError::Parse("row 1: no columns".to_string()));
    }

    for (idx, record) in records.iter().enumerate() {
        if record.len() != width {
            return Err(PipelineError::Parse(format!(
                "row {}: expected {} fields, got {}",
                idx + 1,
                width,
                record.len()
            )));
        }
    }

    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEART_SAMPLE: &str = "\
age,sex,cp,trestbps,target
63,1,3,145,1

37,1,2,130,0
41,0,1,130,1
";

    #[test]
    fn test_parse_csv() -> Result<()> {
        let table = RawTable::parse(HEART_SAMPLE)?;

        assert_eq!(table.column_count(), 5);
        assert_eq!(table.len(), 3);
        assert_eq!(table.headers[0], "age");
        assert_eq!(table.records[1], vec!["37", "1", "2", "130", "0"]);

        Ok(())
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let err = RawTable::parse("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_header_only_is_empty() -> Result<()> {
        let table = RawTable::parse("a,b\n")?;
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_from_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", HEART_SAMPLE)?;
        file.flush()?;

        let table = RawTable::load(file.path()).await?;
        assert_eq!(table.into_records().len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_load_missing_file_is_io_error() {
        let err = RawTable::load("/nonexistent/attrenc/data.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }

    #[test]
    fn test_check_rectangular() {
        let rows = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        assert!(matches!(check_rectangular(&rows), Err(PipelineError::Parse(_))));
        assert!(matches!(check_rectangular(&[]), Err(PipelineError::EmptyDataset)));
    }
}
