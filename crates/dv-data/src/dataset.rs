use std::fmt;
use std::sync::Arc;

use dv_core::Field;

use crate::{create_data_container, DataContainer};

/// A loaded table: identifier, column descriptors and data
#[derive(Clone)]
pub struct Dataset {
    pub id: String,
    pub label: String,
    pub fields: Vec<Field>,
    pub data_container: Arc<dyn DataContainer>,
}

impl Dataset {
    /// An empty dataset with no fields or rows
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            fields: Vec::new(),
            data_container: Arc::new(create_data_container(Vec::new())),
        }
    }

    pub fn with_data(mut self, fields: Vec<Field>, data_container: Arc<dyn DataContainer>) -> Self {
        self.fields = fields;
        self.data_container = data_container;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.data_container.num_rows()
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("fields", &self.fields)
            .field("num_rows", &self.num_rows())
            .finish()
    }
}
