use serde::{Deserialize, Serialize};

/// Column indices a layer reads its positions from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerColumns {
    #[default]
    None,
    Point { lat: usize, lng: usize },
    /// Origin/destination pairs, shared by arc and line layers
    Arc {
        lat0: usize,
        lng0: usize,
        lat1: usize,
        lng1: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerConfig {
    pub data_id: Option<String>,
    pub label: String,
    pub columns: LayerColumns,
}

/// A rendered layer, only consumed for membership checks and positions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub config: LayerConfig,
}

impl Layer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: LayerConfig::default(),
        }
    }

    pub fn with_data(mut self, data_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.config.data_id = Some(data_id.into());
        self.config.label = label.into();
        self
    }

    pub fn with_columns(mut self, columns: LayerColumns) -> Self {
        self.config.columns = columns;
        self
    }
}
