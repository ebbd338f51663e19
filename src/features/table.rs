//! Tabular data export as CSV or Parquet.

use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::ArrowWriter;
use std::sync::Arc;
use tracing::debug;

use crate::core::models::{Location, S3_SCHEME};
use crate::errors::StorageError;
use crate::storage::Storage;
use crate::utils::mime::content_type_for;

/// Cells of one column; `None` is a null cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<Option<i64>>),
    Float64(Vec<Option<f64>>),
    Utf8(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
}

impl ColumnData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn data_type(&self) -> DataType {
        match self {
            ColumnData::Int64(_) => DataType::Int64,
            ColumnData::Float64(_) => DataType::Float64,
            ColumnData::Utf8(_) => DataType::Utf8,
            ColumnData::Boolean(_) => DataType::Boolean,
        }
    }

    fn to_array(&self) -> ArrayRef {
        match self {
            ColumnData::Int64(v) => Arc::new(Int64Array::from(v.clone())),
            ColumnData::Float64(v) => Arc::new(Float64Array::from(v.clone())),
            ColumnData::Utf8(v) => Arc::new(StringArray::from(v.clone())),
            ColumnData::Boolean(v) => Arc::new(BooleanArray::from(v.clone())),
        }
    }
}

impl From<Vec<i64>> for ColumnData {
    fn from(values: Vec<i64>) -> Self {
        ColumnData::Int64(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<f64>> for ColumnData {
    fn from(values: Vec<f64>) -> Self {
        ColumnData::Float64(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<bool>> for ColumnData {
    fn from(values: Vec<bool>) -> Self {
        ColumnData::Boolean(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for ColumnData {
    fn from(values: Vec<&str>) -> Self {
        ColumnData::Utf8(values.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<String>> for ColumnData {
    fn from(values: Vec<String>) -> Self {
        ColumnData::Utf8(values.into_iter().map(Some).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` if the name is taken or the length differs from
    /// the existing columns.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data: impl Into<ColumnData>,
    ) -> Result<Self, StorageError> {
        let name = name.into();
        let data = data.into();
        if self.columns.iter().any(|c| c.name == name) {
            return Err(StorageError::Precondition(format!(
                "duplicate column name {name:?}"
            )));
        }
        if let Some(first) = self.columns.first()
            && first.data.len() != data.len()
        {
            return Err(StorageError::Precondition(format!(
                "column {name:?} has {} rows, expected {}",
                data.len(),
                first.data.len()
            )));
        }
        self.columns.push(Column { name, data });
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    /// # Errors
    ///
    /// Returns `Serialization` if arrow rejects the batch.
    pub fn to_record_batch(&self) -> Result<RecordBatch, StorageError> {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|c| Field::new(c.name.as_str(), c.data.data_type(), true))
            .collect();
        let arrays: Vec<ArrayRef> = self.columns.iter().map(|c| c.data.to_array()).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            arrays,
            &options,
        )?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    /// Format selected by the file name's extension; `None` for anything
    /// other than `.csv` and `.parquet`.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".csv") {
            Some(TableFormat::Csv)
        } else if file_name.ends_with(".parquet") {
            Some(TableFormat::Parquet)
        } else {
            None
        }
    }
}

/// What `export_table` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { uri: String, format: TableFormat },
    /// The file name matched no known format and nothing was written.
    Skipped { uri: String },
}

/// Encodes `table` without touching storage. CSV output has a header row and
/// no row index.
///
/// # Errors
///
/// Returns `Serialization` if the encoder fails.
pub fn encode_table(table: &Table, format: TableFormat) -> Result<Vec<u8>, StorageError> {
    let batch = table.to_record_batch()?;
    match format {
        TableFormat::Csv => {
            let mut writer = arrow::csv::WriterBuilder::new()
                .with_header(true)
                .build(Vec::new());
            writer.write(&batch)?;
            Ok(writer.into_inner())
        }
        TableFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), None)?;
            writer.write(&batch)?;
            Ok(writer.into_inner()?)
        }
    }
}

/// Checks that a bucket path starts and ends with `/`.
///
/// # Errors
///
/// Returns `Precondition` otherwise.
pub fn validate_bucket_path(bucket_path: &str) -> Result<(), StorageError> {
    if bucket_path.starts_with('/') && bucket_path.ends_with('/') {
        Ok(())
    } else {
        Err(StorageError::Precondition(format!(
            "Bucket path is not valid: {bucket_path:?} must start and end with '/'"
        )))
    }
}

impl Storage {
    /// Writes `table` to `location` in `format`.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails, or the backend's error.
    pub async fn write_table(
        &self,
        table: &Table,
        location: &Location,
        format: TableFormat,
    ) -> Result<(), StorageError> {
        let body = encode_table(table, format)?;
        let content_type = location.file_name().map(content_type_for);
        self.write_bytes(location, body, content_type.as_deref()).await
    }

    /// Saves `table` to `s3://{bucket}{bucket_path}{file_name}`, choosing CSV
    /// or Parquet from the file name. Other extensions write nothing and
    /// report `ExportOutcome::Skipped`.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` before any I/O if `bucket_path` does not start
    /// and end with `/`; otherwise encoding or backend errors.
    pub async fn export_table(
        &self,
        table: &Table,
        bucket: &str,
        bucket_path: &str,
        file_name: &str,
    ) -> Result<ExportOutcome, StorageError> {
        validate_bucket_path(bucket_path)?;
        let uri = format!("{S3_SCHEME}://{bucket}{bucket_path}{file_name}");

        let Some(format) = TableFormat::from_file_name(file_name) else {
            debug!(%uri, "no table format for file name, skipping export");
            return Ok(ExportOutcome::Skipped { uri });
        };

        let key = format!("{}{file_name}", &bucket_path[1..]);
        self.write_table(table, &Location::remote(bucket, key), format)
            .await?;
        Ok(ExportOutcome::Written { uri, format })
    }
}
