use catalog_sync::bus::{BroadcastChannel, InMemoryQueue};
use catalog_sync::cache::{CatalogCache, CatalogEditor, HttpCatalogApi, LoadState, SourceError};
use catalog_sync::catalog::{NewProject, Product, Project, ProjectPatch, ProjectStatus};

use crate::support::{start_server, TOKEN};

fn new_project(title: &str) -> NewProject {
    NewProject {
        title: Some(title.into()),
        summary: Some("summary".into()),
        gallery: Some(vec!["https://cdn.example.com/a.png".into()]),
        ..Default::default()
    }
}

#[tokio::test]
async fn editor_over_http_keeps_contexts_in_step() {
    let server = start_server().await;
    let queue = InMemoryQueue::new();
    let api = HttpCatalogApi::new(&server.base).with_token(TOKEN);

    let a = CatalogCache::with_channel(api.clone(), BroadcastChannel::in_memory("catalog-data", &queue));
    let b = CatalogCache::with_channel(
        HttpCatalogApi::new(&server.base),
        BroadcastChannel::in_memory("catalog-data", &queue),
    );
    a.refresh_all().await;
    b.refresh_all().await;

    let editor = CatalogEditor::new(a.clone());
    let created: Project = editor.create(&new_project("Bridge")).await.unwrap();
    let updated: Project = editor
        .update(
            created.numeric_id,
            &ProjectPatch {
                status: Some(ProjectStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::InProgress);

    b.drain_messages().await;
    assert_eq!(b.projects(), vec![updated.clone()]);

    // A fresh fetch agrees with what the broadcast delivered.
    b.refresh_all().await;
    assert_eq!(b.projects(), vec![updated]);
    assert_eq!(b.load_state::<Product>(), LoadState::Ready);
}

#[tokio::test]
async fn unauthorized_client_gets_status_error() {
    let server = start_server().await;
    let cache = CatalogCache::new(HttpCatalogApi::new(&server.base));
    let editor = CatalogEditor::new(cache.clone());

    let err = editor.create::<Project>(&new_project("Bridge")).await.unwrap_err();
    assert!(matches!(err, SourceError::Status { status: 401, .. }));
    assert!(cache.projects().is_empty());
}

#[tokio::test]
async fn unreachable_backend_marks_collections_failed() {
    let cache = CatalogCache::new(HttpCatalogApi::new("http://127.0.0.1:9"));
    cache.refresh_all().await;
    assert!(matches!(cache.load_state::<Product>(), LoadState::Error(_)));
    assert!(matches!(cache.load_state::<Project>(), LoadState::Error(_)));
    assert!(!cache.is_loading());
}
