use std::time::Duration;

use sea_orm::DatabaseConnection;

use super::{DaoBase, TodoDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
    timeout: Option<Duration>,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            db: db.clone(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn todo(&self) -> TodoDao {
        TodoDao::new(&self.db).with_timeout(self.timeout)
    }
}
