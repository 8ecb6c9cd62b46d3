use catalog_sync::bus::InMemoryQueue;
use catalog_sync::cache::{CacheMessage, CacheOptions, CatalogCache, CatalogEditor, LoadState};
use catalog_sync::catalog::{NewProduct, NewProject, Product, ProductPatch, Project};

use crate::support::Backend;

fn context(backend: &Backend, queue: &InMemoryQueue) -> CatalogCache<Backend> {
    CatalogCache::with_queue(backend.handle(), queue, &CacheOptions::default())
}

fn new_product(title: &str) -> NewProduct {
    NewProduct {
        title: Some(title.into()),
        short: Some("short".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn second_context_converges_from_broadcast_without_fetching() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    let b = context(&backend, &queue);

    let editor = CatalogEditor::new(a.clone());
    let created: Product = editor.create(&new_product("Rover")).await.unwrap();
    assert_eq!(created.numeric_id, 1);
    assert_eq!(a.products(), vec![created.clone()]);

    assert_eq!(b.drain_messages().await, 1);
    assert_eq!(b.products(), a.products());
    assert_eq!(b.source().fetches(), 0);
    assert_eq!(b.load_state::<Product>(), LoadState::Idle);

    assert_eq!(a.drain_messages().await, 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn updates_and_deletes_propagate() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    let b = context(&backend, &queue);
    let editor = CatalogEditor::new(a.clone());

    editor.create::<Product>(&new_product("one")).await.unwrap();
    editor.create::<Product>(&new_product("two")).await.unwrap();
    editor
        .update::<Product>(
            1,
            &ProductPatch {
                title: Some("uno".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    editor.delete::<Product>(2).await.unwrap();

    assert_eq!(b.drain_messages().await, 4);
    let titles: Vec<String> = b.products().into_iter().map(|p| p.title).collect();
    assert_eq!(titles, vec!["uno".to_string()]);
    assert_eq!(b.products(), a.products());
}

#[tokio::test]
async fn rejected_mutation_changes_no_context() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    let b = context(&backend, &queue);
    let editor = CatalogEditor::new(a.clone());

    let err = editor
        .create::<Project>(&NewProject {
            title: Some("Bridge".into()),
            summary: Some("steel".into()),
            gallery: Some(vec![]),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("gallery"));
    assert!(a.projects().is_empty());
    assert_eq!(b.drain_messages().await, 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn late_context_gets_no_replay_but_catches_up_on_refresh() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    CatalogEditor::new(a.clone())
        .create::<Product>(&new_product("early"))
        .await
        .unwrap();

    let late = context(&backend, &queue);
    assert_eq!(late.drain_messages().await, 0);
    assert!(late.products().is_empty());

    late.refresh_all().await;
    assert_eq!(late.products(), a.products());
}

#[tokio::test]
async fn refresh_all_message_triggers_refetch() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    let b = context(&backend, &queue);

    a.broadcast(&CacheMessage::RefreshAll);
    b.drain_messages().await;

    assert_eq!(b.source().fetches(), 2);
    assert_eq!(a.source().fetches(), 0);
    assert_eq!(b.load_state::<Project>(), LoadState::Ready);
}

#[tokio::test]
async fn failing_collection_keeps_its_items_and_the_other_refreshes() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let cache = context(&backend, &queue);

    backend
        .catalog()
        .create::<Project>(NewProject {
            title: Some("Tracker".into()),
            summary: Some("solar".into()),
            gallery: Some(vec!["https://cdn.example.com/t.png".into()]),
            ..Default::default()
        })
        .unwrap();
    cache.refresh_all().await;
    assert_eq!(cache.projects().len(), 1);

    backend.catalog().create::<Product>(new_product("Rover")).unwrap();
    cache.source().fail_projects(true);
    cache.refresh_all().await;

    assert_eq!(cache.products().len(), 1);
    assert_eq!(cache.load_state::<Product>(), LoadState::Ready);
    assert_eq!(cache.projects().len(), 1);
    assert!(matches!(cache.load_state::<Project>(), LoadState::Error(_)));
    assert!(!cache.is_loading());

    cache.source().fail_projects(false);
    cache.refresh_all().await;
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn unknown_messages_are_ignored() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let a = context(&backend, &queue);
    let b = context(&backend, &queue);

    a.broadcast(&CacheMessage::Unknown);
    assert_eq!(b.drain_messages().await, 1);
    assert!(b.products().is_empty());
    assert_eq!(b.source().fetches(), 0);
}
