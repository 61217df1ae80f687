use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use dv_core::Value;

use super::DataContainer;
use crate::DataError;

/// Normalized column storage
enum Column {
    /// Numbers, timestamps and dates (as ms since epoch)
    Number(Float64Array),
    Bool(BooleanArray),
    Text(StringArray),
}

/// Container over an Arrow record batch.
///
/// Columns are normalized once on construction: numeric columns to `f64`,
/// timestamps and dates to milliseconds since epoch, strings to utf8.
pub struct ArrowDataContainer {
    columns: Vec<Column>,
    num_rows: usize,
}

impl ArrowDataContainer {
    pub fn try_new(batch: &RecordBatch) -> Result<Self, DataError> {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| Self::normalize(field.name(), array))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::trace!(
            "Arrow container with {} rows, {} columns",
            batch.num_rows(),
            columns.len()
        );

        Ok(Self {
            columns,
            num_rows: batch.num_rows(),
        })
    }

    fn normalize(name: &str, array: &ArrayRef) -> Result<Column, DataError> {
        let to_number = |array: &ArrayRef| -> Result<Column, DataError> {
            let numbers = cast(array, &DataType::Float64)?;
            Ok(Column::Number(downcast::<Float64Array>(name, &numbers)?))
        };

        match array.data_type() {
            DataType::Boolean => Ok(Column::Bool(downcast::<BooleanArray>(name, array)?)),
            DataType::Utf8 | DataType::LargeUtf8 => {
                let text = cast(array, &DataType::Utf8)?;
                Ok(Column::Text(downcast::<StringArray>(name, &text)?))
            }
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => to_number(array),
            DataType::Timestamp(_, _) => {
                let millis = cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
                to_number(&cast(&millis, &DataType::Int64)?)
            }
            DataType::Date32 | DataType::Date64 => {
                let millis = cast(array, &DataType::Date64)?;
                to_number(&cast(&millis, &DataType::Int64)?)
            }
            other => Err(DataError::UnsupportedColumn {
                column: name.to_string(),
                data_type: other.clone(),
            }),
        }
    }
}

fn downcast<T: Array + Clone + 'static>(name: &str, array: &ArrayRef) -> Result<T, DataError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .cloned()
        .ok_or_else(|| DataError::UnsupportedColumn {
            column: name.to_string(),
            data_type: array.data_type().clone(),
        })
}

impl DataContainer for ArrowDataContainer {
    fn num_rows(&self) -> usize {
        self.num_rows
    }

    fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn value_at(&self, row: usize, column: usize) -> Value {
        if row >= self.num_rows {
            return Value::Null;
        }
        match self.columns.get(column) {
            Some(Column::Number(array)) if !array.is_null(row) => Value::Number(array.value(row)),
            Some(Column::Bool(array)) if !array.is_null(row) => Value::Bool(array.value(row)),
            Some(Column::Text(array)) if !array.is_null(row) => {
                Value::String(array.value(row).to_string())
            }
            _ => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("count", DataType::Int32, true),
            Field::new("label", DataType::Utf8, false),
            Field::new("flag", DataType::Boolean, false),
            Field::new("time", DataType::Timestamp(TimeUnit::Second, None), false),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![Some(3), None])),
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(BooleanArray::from(vec![true, false])),
                Arc::new(TimestampSecondArray::from(vec![1475315139, 1475315145])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_arrow_columns_are_normalized() {
        let container = ArrowDataContainer::try_new(&batch()).unwrap();

        assert_eq!(container.num_rows(), 2);
        assert_eq!(container.num_columns(), 4);
        assert_eq!(container.value_at(0, 0), Value::Number(3.0));
        assert_eq!(container.value_at(1, 0), Value::Null);
        assert_eq!(container.value_at(1, 1), Value::from("b"));
        assert_eq!(container.value_at(0, 2), Value::Bool(true));
        assert_eq!(container.value_at(0, 3), Value::Number(1475315139000.0));
        assert_eq!(container.value_at(9, 0), Value::Null);
    }

    #[test]
    fn test_unsupported_column_rejected() {
        let schema = Schema::new(vec![Field::new("bin", DataType::Binary, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(arrow::array::BinaryArray::from(vec![b"x".as_ref()]))],
        )
        .unwrap();
        assert!(matches!(
            ArrowDataContainer::try_new(&batch),
            Err(DataError::UnsupportedColumn { .. })
        ));
    }
}
