//! Input columns as seen by analysis jobs

use serde::{Deserialize, Serialize};

use crate::ColumnRef;

/// A column flowing into a job component.
///
/// Physical input columns wrap a real datastore column; virtual ones are
/// produced by transformations and only exist while a job runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputColumn {
    Physical(ColumnRef),
    Virtual { name: String },
}

impl InputColumn {
    pub fn physical(column: ColumnRef) -> Self {
        Self::Physical(column)
    }

    pub fn virtual_column(name: impl Into<String>) -> Self {
        Self::Virtual { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Physical(column) => &column.name,
            Self::Virtual { name } => name,
        }
    }

    pub fn is_physical_column(&self) -> bool {
        matches!(self, Self::Physical(_))
    }

    pub fn physical_column(&self) -> Option<&ColumnRef> {
        match self {
            Self::Physical(column) => Some(column),
            Self::Virtual { .. } => None,
        }
    }
}

impl From<ColumnRef> for InputColumn {
    fn from(column: ColumnRef) -> Self {
        Self::Physical(column)
    }
}
