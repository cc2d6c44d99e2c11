use std::time::Duration;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use super::base::{DaoBase, Page, guarded};
use super::base_traits::TimestampedActiveModel;
use super::{DaoLayerError, DaoOp, DaoResult, Patch};
use crate::db::entities::prelude::Todo;
use crate::db::entities::todo;

const ENTITY: &str = "todo";

#[derive(Clone)]
pub struct TodoDao {
    db: DatabaseConnection,
    timeout: Option<Duration>,
}

impl DaoBase for TodoDao {
    type Entity = Todo;

    fn new(db: &DatabaseConnection) -> Self {
        Self {
            db: db.clone(),
            timeout: None,
        }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Fields of a partial update. Only `Present` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub completed: Patch<bool>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        !self.title.is_present() && !self.description.is_present() && !self.completed.is_present()
    }

    /// Marks one column as changed per present field. Unmarked columns stay
    /// out of the generated `UPDATE`, so its placeholders line up with
    /// exactly the supplied values.
    fn assign(self, active: &mut todo::ActiveModel) {
        if let Patch::Present(title) = self.title {
            active.title = Set(title);
        }
        if let Patch::Present(description) = self.description {
            active.description = Set(description);
        }
        if let Patch::Present(completed) = self.completed {
            active.completed = Set(completed);
        }
    }
}

fn id_target(id: i64) -> impl FnOnce() -> String {
    move || format!("id={id}")
}

fn completed_filter(select: Select<Todo>, completed: Option<bool>) -> Select<Todo> {
    match completed {
        Some(completed) => select.filter(todo::Column::Completed.eq(completed)),
        None => select,
    }
}

impl TodoDao {
    pub async fn create(&self, data: NewTodo) -> DaoResult<todo::Model> {
        let now = Utc::now().fixed_offset();
        let mut active = todo::ActiveModel {
            title: Set(data.title),
            description: Set(data.description),
            completed: Set(data.completed),
            ..Default::default()
        };
        active.set_created_at(now);
        active.set_updated_at(now);

        guarded(
            DaoOp::Create,
            self.timeout(),
            || "new record".to_string(),
            active.insert(self.db()),
        )
        .await
    }

    pub async fn find_by_id(&self, id: i64) -> DaoResult<todo::Model> {
        self.lookup(DaoOp::Get, id).await
    }

    pub async fn list(
        &self,
        page: i64,
        page_size: i64,
        completed: Option<bool>,
    ) -> DaoResult<Page<todo::Model>> {
        let request = Self::page_request(page, page_size);
        let target = move || {
            format!(
                "page={} page_size={} completed={completed:?}",
                request.page, request.page_size
            )
        };

        let total = guarded(
            DaoOp::List,
            self.timeout(),
            target,
            completed_filter(Todo::find(), completed).count(self.db()),
        )
        .await?;

        if request.offset() >= total {
            return Ok(Page::empty(request, total));
        }

        let items = guarded(
            DaoOp::List,
            self.timeout(),
            target,
            Self::paged(completed_filter(Todo::find(), completed), request)
                .order_by_desc(todo::Column::Id)
                .all(self.db()),
        )
        .await?;

        Ok(Page {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        })
    }

    /// Applies the present fields of `changes`. The record must exist; with
    /// no present fields it is returned untouched and nothing is written.
    pub async fn update(&self, id: i64, changes: TodoChanges) -> DaoResult<todo::Model> {
        let existing = self.lookup(DaoOp::Update, id).await?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let mut active = existing.into_active_model();
        changes.assign(&mut active);
        active.set_updated_at(Utc::now().fixed_offset());

        match guarded(DaoOp::Update, self.timeout(), id_target(id), active.update(self.db())).await {
            // Deleted between the existence check and the write.
            Err(DaoLayerError::Db {
                source: DbErr::RecordNotUpdated,
                ..
            }) => Err(DaoLayerError::NotFound { entity: ENTITY, id }),
            result => result,
        }
    }

    /// Hard delete; absence is detected from the affected-row count.
    pub async fn delete(&self, id: i64) -> DaoResult<()> {
        let result = guarded(
            DaoOp::Delete,
            self.timeout(),
            id_target(id),
            Todo::delete_by_id(id).exec(self.db()),
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }

    async fn lookup(&self, op: DaoOp, id: i64) -> DaoResult<todo::Model> {
        let model = guarded(
            op,
            self.timeout(),
            id_target(id),
            Todo::find_by_id(id).one(self.db()),
        )
        .await?;

        model.ok_or(DaoLayerError::NotFound { entity: ENTITY, id })
    }
}
