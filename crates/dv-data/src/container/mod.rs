//! Read-only row/column access to tabular data

mod arrow_container;

pub use arrow_container::ArrowDataContainer;

use dv_core::Value;

use crate::DataError;

/// Tabular data as seen by the filter engine
pub trait DataContainer: Send + Sync {
    fn num_rows(&self) -> usize;

    fn num_columns(&self) -> usize;

    /// Cell at `row`, `column`; out of range cells read as `Value::Null`
    fn value_at(&self, row: usize, column: usize) -> Value;

    /// All cells of a row
    fn row(&self, row: usize) -> Vec<Value> {
        (0..self.num_columns())
            .map(|column| self.value_at(row, column))
            .collect()
    }
}

/// Row-major container over already materialized values
#[derive(Debug, Clone, Default)]
pub struct RowDataContainer {
    rows: Vec<Vec<Value>>,
    num_columns: usize,
}

impl RowDataContainer {
    /// Build a container, rejecting rows of differing width
    pub fn try_new(rows: Vec<Vec<Value>>) -> Result<Self, DataError> {
        let expected = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(DataError::RaggedRow {
                row,
                found,
                expected,
            });
        }
        Ok(Self {
            rows,
            num_columns: expected,
        })
    }
}

impl DataContainer for RowDataContainer {
    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn num_columns(&self) -> usize {
        self.num_columns
    }

    fn value_at(&self, row: usize, column: usize) -> Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .cloned()
            .unwrap_or_default()
    }
}

/// Wrap rows in a container; short rows read as null past their end
pub fn create_data_container(rows: Vec<Vec<Value>>) -> RowDataContainer {
    let num_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    RowDataContainer { rows, num_columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_container_access() {
        let container = create_data_container(vec![
            vec![Value::from(1.0), Value::from("a")],
            vec![Value::from(2.0)],
        ]);

        assert_eq!(container.num_rows(), 2);
        assert_eq!(container.num_columns(), 2);
        assert_eq!(container.value_at(0, 1), Value::from("a"));
        assert_eq!(container.value_at(1, 1), Value::Null);
        assert_eq!(container.value_at(5, 0), Value::Null);
        assert_eq!(container.row(0), vec![Value::from(1.0), Value::from("a")]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = RowDataContainer::try_new(vec![vec![Value::Null, Value::Null], vec![Value::Null]]);
        assert!(matches!(
            result,
            Err(DataError::RaggedRow {
                row: 1,
                found: 1,
                expected: 2
            })
        ));
    }
}
