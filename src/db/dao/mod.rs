pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod patch;
pub mod todo_dao;

pub use base::{DaoBase, Page, PageRequest};
pub use base_traits::{HasCreatedAtColumn, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoOp, DaoResult};
pub use patch::Patch;
pub use todo_dao::{NewTodo, TodoChanges, TodoDao};
