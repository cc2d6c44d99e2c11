use std::{fmt, time::Duration};

use sea_orm::DbErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaoOp {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl fmt::Display for DaoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DaoOp::Create => "create",
            DaoOp::Get => "get",
            DaoOp::List => "list",
            DaoOp::Update => "update",
            DaoOp::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaoLayerError {
    /// The store was unreachable, rejected the statement or returned rows
    /// that could not be decoded. `target` names the id or filter involved.
    #[error("database error during {op} ({target}): {source}")]
    Db {
        op: DaoOp,
        target: String,
        #[source]
        source: DbErr,
    },
    #[error("{entity} not found (id={id})")]
    NotFound { entity: &'static str, id: i64 },
    #[error("{op} cancelled after {after:?}")]
    Cancelled { op: DaoOp, after: Duration },
}

pub type DaoResult<T> = Result<T, DaoLayerError>;

impl DaoLayerError {
    pub fn op(&self) -> Option<DaoOp> {
        match self {
            DaoLayerError::Db { op, .. } | DaoLayerError::Cancelled { op, .. } => Some(*op),
            DaoLayerError::NotFound { .. } => None,
        }
    }
}
