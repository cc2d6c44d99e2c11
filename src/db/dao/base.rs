use std::{future::Future, time::Duration};

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder, QuerySelect, Select};

use super::base_traits::HasCreatedAtColumn;
use super::error::{DaoLayerError, DaoOp, DaoResult};

/// A normalized page window. Out-of-range input is coerced, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// `page < 1` becomes 1; a `page_size` outside `1..=max_page_size`
    /// becomes `default_page_size`.
    pub fn normalize(page: i64, page_size: i64, max_page_size: u64, default_page_size: u64) -> Self {
        let page = u64::try_from(page).ok().filter(|page| *page >= 1).unwrap_or(1);
        let page_size = u64::try_from(page_size)
            .ok()
            .filter(|size| (1..=max_page_size).contains(size))
            .unwrap_or(default_page_size);
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn empty(request: PageRequest, total: u64) -> Self {
        Self {
            items: Vec::new(),
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    /// `ceil(total / page_size)`, never less than one page.
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 1;
        }
        self.total.div_ceil(self.page_size).max(1)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

pub trait DaoBase: Clone + Send + Sync + Sized {
    type Entity: EntityTrait + HasCreatedAtColumn + Send + Sync;
    const MAX_PAGE_SIZE: u64 = 100;
    const DEFAULT_PAGE_SIZE: u64 = 10;

    fn new(db: &DatabaseConnection) -> Self;

    fn db(&self) -> &DatabaseConnection;

    /// Deadline applied to each statement issued by this DAO.
    fn timeout(&self) -> Option<Duration>;

    fn with_timeout(self, timeout: Option<Duration>) -> Self;

    fn page_request(page: i64, page_size: i64) -> PageRequest {
        PageRequest::normalize(page, page_size, Self::MAX_PAGE_SIZE, Self::DEFAULT_PAGE_SIZE)
    }

    /// Newest first, sliced to the requested window.
    fn paged(select: Select<Self::Entity>, request: PageRequest) -> Select<Self::Entity> {
        select
            .order_by_desc(Self::Entity::created_at_column())
            .limit(request.page_size)
            .offset(request.offset())
    }
}

/// Awaits a store call under an optional deadline. An elapsed deadline drops
/// the in-flight call and reports [`DaoLayerError::Cancelled`]; store failures
/// are wrapped with the operation and the `target` it was acting on.
pub async fn guarded<T, F>(
    op: DaoOp,
    timeout: Option<Duration>,
    target: impl FnOnce() -> String,
    call: F,
) -> DaoResult<T>
where
    F: Future<Output = Result<T, DbErr>>,
{
    let result = match timeout {
        Some(after) => tokio::time::timeout(after, call)
            .await
            .map_err(|_| DaoLayerError::Cancelled { op, after })?,
        None => call.await,
    };

    result.map_err(|source| DaoLayerError::Db {
        op,
        target: target(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sea_orm::DbErr;

    use super::{Page, PageRequest, guarded};
    use crate::db::dao::{DaoLayerError, DaoOp};

    fn request(page: i64, page_size: i64) -> PageRequest {
        PageRequest::normalize(page, page_size, 100, 10)
    }

    #[test]
    fn normalize_coerces_out_of_range_values() {
        assert_eq!(request(0, 500), request(1, 10));
        assert_eq!(request(-3, 0), PageRequest { page: 1, page_size: 10 });
        assert_eq!(request(2, 101).page_size, 10);
        assert_eq!(request(4, 100), PageRequest { page: 4, page_size: 100 });
        assert_eq!(request(1, 1).page_size, 1);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(request(1, 10).offset(), 0);
        assert_eq!(request(3, 25).offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up_with_a_floor_of_one() {
        let page = |total, page_size| Page::<()>::empty(request(1, page_size), total);

        assert_eq!(page(10, 5).total_pages(), 2);
        assert_eq!(page(11, 5).total_pages(), 3);
        assert_eq!(page(1, 10).total_pages(), 1);
        assert_eq!(page(0, 10).total_pages(), 1);
    }

    #[tokio::test]
    async fn guarded_wraps_store_errors_with_context() {
        let err = guarded::<(), _>(DaoOp::Get, None, || "id=9".to_string(), async {
            Err(DbErr::Custom("boom".to_string()))
        })
        .await
        .expect_err("call should fail");

        assert!(matches!(
            err,
            DaoLayerError::Db { op: DaoOp::Get, ref target, .. } if target == "id=9"
        ));
        assert!(err.to_string().contains("during get (id=9)"));
    }

    #[tokio::test]
    async fn guarded_reports_cancellation_when_deadline_elapses() {
        let deadline = Duration::from_millis(10);
        let err = guarded::<(), _>(DaoOp::List, Some(deadline), String::new, async {
            std::future::pending::<Result<(), DbErr>>().await
        })
        .await
        .expect_err("call should time out");

        assert!(matches!(
            err,
            DaoLayerError::Cancelled { op: DaoOp::List, after } if after == deadline
        ));
    }

    #[tokio::test]
    async fn guarded_passes_through_results_within_deadline() {
        let value = guarded(
            DaoOp::Create,
            Some(Duration::from_secs(5)),
            String::new,
            async { Ok::<_, DbErr>(7) },
        )
        .await
        .expect("call should succeed");
        assert_eq!(value, 7);
    }
}
