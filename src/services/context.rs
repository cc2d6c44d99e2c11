use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::{db::dao::DaoContext, services::todo_service::TodoService, state::AppState};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.daos = self.daos.with_timeout(timeout);
        self
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db).with_timeout(state.config.database.statement_timeout())
    }

    pub fn todo(&self) -> TodoService {
        TodoService::new(self.daos.todo())
    }
}
