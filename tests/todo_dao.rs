use std::{collections::HashSet, time::Duration};

use todo_api::{
    db::dao::{DaoBase, DaoLayerError, NewTodo, Patch, TodoChanges, TodoDao},
    test_helpers::memory_db,
};

async fn dao() -> TodoDao {
    TodoDao::new(&memory_db().await)
}

fn new_todo(title: &str, completed: bool) -> NewTodo {
    NewTodo {
        title: title.to_string(),
        description: String::new(),
        completed,
    }
}

async fn seed(dao: &TodoDao, count: usize, completed: bool) {
    for i in 0..count {
        dao.create(new_todo(&format!("todo {i}"), completed))
            .await
            .expect("create todo");
    }
}

#[tokio::test]
async fn create_assigns_unique_ids_and_matching_timestamps() {
    let dao = dao().await;
    let mut ids = HashSet::new();

    for i in 0..5 {
        let todo = dao
            .create(new_todo(&format!("todo {i}"), false))
            .await
            .expect("create todo");
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(ids.insert(todo.id), "id {} was handed out twice", todo.id);
    }
}

#[tokio::test]
async fn missing_ids_are_not_found_everywhere() {
    let dao = dao().await;

    let get = dao.find_by_id(999).await.expect_err("get should fail");
    let update = dao
        .update(
            999,
            TodoChanges {
                title: Patch::Present("x".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("update should fail");
    let noop_update = dao
        .update(999, TodoChanges::default())
        .await
        .expect_err("empty update should still check existence");
    let delete = dao.delete(999).await.expect_err("delete should fail");

    for err in [get, update, noop_update, delete] {
        assert!(
            matches!(err, DaoLayerError::NotFound { id: 999, .. }),
            "unexpected error: {err}"
        );
    }
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let dao = dao().await;
    let created = dao.create(new_todo("read me", false)).await.unwrap();

    let first = dao.find_by_id(created.id).await.unwrap();
    let second = dao.find_by_id(created.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, created);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let dao = dao().await;
    let created = dao
        .create(NewTodo {
            title: "before".to_string(),
            description: "keep me".to_string(),
            completed: true,
        })
        .await
        .unwrap();

    let updated = dao
        .update(
            created.id,
            TodoChanges {
                title: Patch::Present("X".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "X");
    assert_eq!(updated.description, "keep me");
    assert!(updated.completed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(dao.find_by_id(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn empty_update_leaves_record_untouched() {
    let dao = dao().await;
    let created = dao.create(new_todo("stable", false)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let result = dao
        .update(created.id, TodoChanges::default())
        .await
        .unwrap();

    assert_eq!(result, created);
    assert_eq!(dao.find_by_id(created.id).await.unwrap().updated_at, created.updated_at);
}

#[tokio::test]
async fn description_can_be_cleared() {
    let dao = dao().await;
    let created = dao
        .create(NewTodo {
            title: "with notes".to_string(),
            description: "notes".to_string(),
            completed: false,
        })
        .await
        .unwrap();

    let updated = dao
        .update(
            created.id,
            TodoChanges {
                description: Patch::Present(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "");
    assert_eq!(updated.title, "with notes");
}

#[tokio::test]
async fn pagination_reports_page_counts() {
    let dao = dao().await;

    let empty = dao.list(1, 10, None).await.unwrap();
    assert_eq!(empty.total, 0);
    assert!(empty.items.is_empty());
    assert_eq!(empty.total_pages(), 1);

    seed(&dao, 10, false).await;

    let first = dao.list(1, 5, None).await.unwrap();
    assert_eq!(first.total, 10);
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.total_pages(), 2);

    let second = dao.list(2, 5, None).await.unwrap();
    assert_eq!(second.items.len(), 5);
    let first_ids: HashSet<_> = first.items.iter().map(|todo| todo.id).collect();
    assert!(second.items.iter().all(|todo| !first_ids.contains(&todo.id)));

    let beyond = dao.list(3, 5, None).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 10);
    assert_eq!(beyond.page, 3);
}

#[tokio::test]
async fn list_is_newest_first() {
    let dao = dao().await;
    seed(&dao, 3, false).await;

    let page = dao.list(1, 10, None).await.unwrap();
    let ids: Vec<_> = page.items.iter().map(|todo| todo.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    assert_eq!(ids, sorted);
    assert!(
        page.items
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}

#[tokio::test]
async fn completed_filter_selects_matching_records() {
    let dao = dao().await;
    seed(&dao, 3, true).await;
    seed(&dao, 2, false).await;

    let done = dao.list(1, 10, Some(true)).await.unwrap();
    assert_eq!(done.total, 3);
    assert_eq!(done.items.len(), 3);
    assert!(done.items.iter().all(|todo| todo.completed));

    let open = dao.list(1, 10, Some(false)).await.unwrap();
    assert_eq!(open.total, 2);
    assert!(open.items.iter().all(|todo| !todo.completed));

    assert_eq!(dao.list(1, 10, None).await.unwrap().total, 5);
}

#[tokio::test]
async fn out_of_range_paging_is_normalized() {
    let dao = dao().await;
    seed(&dao, 12, false).await;

    let normalized = dao.list(0, 500, None).await.unwrap();
    let explicit = dao.list(1, 10, None).await.unwrap();

    assert_eq!(normalized.page, 1);
    assert_eq!(normalized.page_size, 10);
    assert_eq!(normalized.total, explicit.total);
    assert_eq!(normalized.items, explicit.items);
}

#[tokio::test]
async fn deleted_records_are_gone() {
    let dao = dao().await;
    let created = dao.create(new_todo("short lived", false)).await.unwrap();

    dao.delete(created.id).await.expect("delete todo");

    assert!(matches!(
        dao.find_by_id(created.id).await,
        Err(DaoLayerError::NotFound { .. })
    ));
    assert!(matches!(
        dao.delete(created.id).await,
        Err(DaoLayerError::NotFound { .. })
    ));
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let dao = dao().await;
    let first = dao.create(new_todo("first", false)).await.unwrap();
    dao.delete(first.id).await.unwrap();

    let second = dao.create(new_todo("second", false)).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn buy_milk_lifecycle() {
    let dao = dao().await;

    let created = dao.create(new_todo("Buy milk", false)).await.unwrap();
    assert!(created.id > 0);
    assert!(!created.completed);
    assert_eq!(created.description, "");
    assert_eq!(created.created_at, created.updated_at);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let updated = dao
        .update(
            created.id,
            TodoChanges {
                completed: Patch::Present(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");
    assert!(updated.updated_at > created.updated_at);

    dao.delete(created.id).await.unwrap();
    assert!(matches!(
        dao.find_by_id(created.id).await,
        Err(DaoLayerError::NotFound { .. })
    ));
}
