use tracing::{debug, error, info};

use crate::{
    db::{
        dao::{DaoLayerError, NewTodo, Page, TodoChanges, TodoDao},
        entities::todo,
    },
    error::AppError,
};

#[derive(Clone)]
pub struct TodoService {
    todo_dao: TodoDao,
}

impl TodoService {
    pub fn new(todo_dao: TodoDao) -> Self {
        Self { todo_dao }
    }

    pub async fn create(&self, data: NewTodo) -> Result<todo::Model, AppError> {
        debug!(title = %data.title, "creating todo");
        match self.todo_dao.create(data).await {
            Ok(todo) => {
                info!(id = todo.id, "todo created");
                Ok(todo)
            }
            Err(err) => Err(report(err, "failed to create todo", None)),
        }
    }

    pub async fn get(&self, id: i64) -> Result<todo::Model, AppError> {
        debug!(id, "getting todo");
        self.todo_dao
            .find_by_id(id)
            .await
            .map_err(|err| report(err, "failed to get todo", Some(id)))
    }

    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
        completed: Option<bool>,
    ) -> Result<Page<todo::Model>, AppError> {
        debug!(page, page_size, ?completed, "listing todos");
        self.todo_dao
            .list(page, page_size, completed)
            .await
            .map_err(|err| report(err, "failed to list todos", None))
    }

    pub async fn update(&self, id: i64, changes: TodoChanges) -> Result<todo::Model, AppError> {
        debug!(id, "updating todo");
        match self.todo_dao.update(id, changes).await {
            Ok(todo) => {
                info!(id, "todo updated");
                Ok(todo)
            }
            Err(err) => Err(report(err, "failed to update todo", Some(id))),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        debug!(id, "deleting todo");
        self.todo_dao
            .delete(id)
            .await
            .map_err(|err| report(err, "failed to delete todo", Some(id)))?;
        info!(id, "todo deleted");
        Ok(())
    }
}

// Missing records are an expected outcome and only reach the debug log.
fn report(err: DaoLayerError, message: &'static str, id: Option<i64>) -> AppError {
    match &err {
        DaoLayerError::NotFound { .. } => debug!(?id, error = %err, "{message}"),
        _ => error!(?id, op = ?err.op(), error = %err, "{message}"),
    }
    err.into()
}
