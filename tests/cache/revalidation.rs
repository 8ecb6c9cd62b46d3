use std::time::Duration;

use catalog_sync::bus::{BroadcastChannel, InMemoryQueue};
use catalog_sync::cache::{CacheMessage, CacheOptions, CatalogCache, HostContext};
use catalog_sync::catalog::{NewProduct, Product};

use crate::support::Backend;

fn options() -> CacheOptions {
    CacheOptions {
        revalidate_every: Duration::from_secs(60),
        message_poll: Duration::from_secs(5),
        refresh_on_start: false,
        ..CacheOptions::default()
    }
}

#[tokio::test(start_paused = true)]
async fn interval_refreshes_only_while_visible() {
    let backend = Backend::new();
    let cache = CatalogCache::new(backend.handle());
    let host = HostContext::hidden();
    let handle = cache.start(host.clone(), options());

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(cache.source().fetches(), 0);

    host.set_visible(true);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(cache.source().fetches(), 2);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.hidden_skips, 1);
    assert_eq!(stats.interval_refreshes, 1);
}

#[tokio::test(start_paused = true)]
async fn focus_triggers_refresh() {
    let backend = Backend::new();
    backend
        .catalog()
        .create::<Product>(NewProduct {
            title: Some("Rover".into()),
            short: Some("robot".into()),
            ..Default::default()
        })
        .unwrap();

    let cache = CatalogCache::new(backend.handle());
    let host = HostContext::hidden();
    let handle = cache.start(host.clone(), options());

    host.focus();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(cache.source().fetches(), 2);
    assert_eq!(cache.products().len(), 1);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.focus_refreshes, 1);
}

#[tokio::test(start_paused = true)]
async fn initial_load_on_start() {
    let backend = Backend::new();
    let cache = CatalogCache::new(backend.handle());
    let handle = cache.start(
        HostContext::new(),
        CacheOptions {
            refresh_on_start: true,
            ..options()
        },
    );

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(cache.source().fetches(), 2);
    handle.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn running_task_applies_channel_messages() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let sender = BroadcastChannel::in_memory("catalog-data", &queue);
    let cache = CatalogCache::with_channel(
        backend.handle(),
        BroadcastChannel::in_memory("catalog-data", &queue),
    );
    let handle = cache.start(HostContext::new(), options());

    let product = backend
        .catalog()
        .create::<Product>(NewProduct {
            title: Some("Arm".into()),
            short: Some("gripper".into()),
            ..Default::default()
        })
        .unwrap();
    sender
        .post(&CacheMessage::ProductUpsert { payload: product.clone() })
        .unwrap();

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(cache.products(), vec![product]);
    assert_eq!(cache.source().fetches(), 0);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.messages_handled, 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_task() {
    let backend = Backend::new();
    let cache = CatalogCache::new(backend.handle());
    let host = HostContext::new();
    drop(cache.start(host.clone(), options()));

    tokio::time::sleep(Duration::from_millis(10)).await;
    host.focus();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(cache.source().fetches(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_periods_keep_the_task_running() {
    let backend = Backend::new();
    let queue = InMemoryQueue::new();
    let sender = BroadcastChannel::in_memory("catalog-data", &queue);
    let cache = CatalogCache::with_queue(backend.handle(), &queue, &CacheOptions::default());
    let handle = cache.start(
        HostContext::hidden(),
        CacheOptions {
            revalidate_every: Duration::ZERO,
            message_poll: Duration::ZERO,
            ..options()
        },
    );

    sender.post(&CacheMessage::ProductRemove { numeric_id: 9u64.into() }).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.messages_handled, 1);
    assert!(stats.hidden_skips > 0);
    assert_eq!(cache.source().fetches(), 0);
}
