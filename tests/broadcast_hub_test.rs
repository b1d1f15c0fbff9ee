//! Tests for listener registration and fan-out.

use std::sync::Arc;
use std::time::Duration;
use strictly_lobby::BroadcastHub;

#[test]
fn test_each_listener_gets_exactly_one_copy() {
    let hub: BroadcastHub<String> = BroadcastHub::new();
    let mut listeners: Vec<_> = (0..5).map(|_| hub.register()).collect();

    assert_eq!(hub.publish("m".to_string()), 5);

    for listener in &mut listeners {
        assert_eq!(listener.try_recv().as_deref(), Some("m"));
        assert_eq!(listener.try_recv(), None);
    }
}

#[test]
fn test_per_listener_fifo() {
    let hub: BroadcastHub<u32> = BroadcastHub::new();
    let mut a = hub.register();
    let mut b = hub.register();

    for n in 0..100 {
        hub.publish(n);
    }

    for listener in [&mut a, &mut b] {
        let received: Vec<u32> = std::iter::from_fn(|| listener.try_recv()).collect();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }
}

#[test]
fn test_late_listener_sees_nothing_earlier() {
    let hub: BroadcastHub<u32> = BroadcastHub::new();
    let mut early = hub.register();
    hub.publish(1);
    let mut late = hub.register();
    hub.publish(2);

    assert_eq!(early.try_recv(), Some(1));
    assert_eq!(early.try_recv(), Some(2));
    assert_eq!(late.try_recv(), Some(2));
    assert_eq!(late.try_recv(), None);
}

#[test]
fn test_unregistered_listener_is_skipped() {
    let hub: BroadcastHub<u32> = BroadcastHub::new();
    let gone = hub.register();
    let mut stays = hub.register();
    gone.unregister();

    assert_eq!(hub.publish(3), 1);
    assert_eq!(stays.try_recv(), Some(3));
}

#[test]
fn test_stalled_listener_does_not_block_publish() {
    let hub: BroadcastHub<Vec<u8>> = BroadcastHub::new();
    let _stalled = hub.register();
    let mut active = hub.register();

    for _ in 0..10_000 {
        hub.publish(vec![0; 64]);
    }
    assert_eq!(std::iter::from_fn(|| active.try_recv()).count(), 10_000);
}

#[tokio::test]
async fn test_recv_waits_for_publish() {
    let hub: BroadcastHub<&'static str> = BroadcastHub::new();
    let mut listener = hub.register();

    let publisher = hub.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        publisher.publish("hello");
    });

    let received = tokio::time::timeout(Duration::from_secs(5), listener.recv())
        .await
        .expect("timed out");
    assert_eq!(received, Some("hello"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_churn_during_publish_never_fails() {
    let hub: Arc<BroadcastHub<u64>> = Arc::new(BroadcastHub::new());
    let mut steady = hub.register();

    let churn = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for _ in 0..500 {
                let handle = hub.register();
                tokio::task::yield_now().await;
                drop(handle);
            }
        })
    };

    let publisher = {
        let hub = Arc::clone(&hub);
        tokio::spawn(async move {
            for n in 0..500 {
                hub.publish(n);
                tokio::task::yield_now().await;
            }
        })
    };

    churn.await.expect("churn task panicked");
    publisher.await.expect("publisher task panicked");

    let received: Vec<u64> = std::iter::from_fn(|| steady.try_recv()).collect();
    assert_eq!(received, (0..500).collect::<Vec<_>>());
    assert_eq!(hub.listener_count(), 1);
}

#[tokio::test]
async fn test_dropped_task_releases_registration() {
    let hub: BroadcastHub<u32> = BroadcastHub::new();
    let mut handle = hub.register();

    let task = tokio::spawn(async move {
        // Waits forever; aborting the task drops the handle.
        handle.recv().await
    });
    tokio::task::yield_now().await;
    assert_eq!(hub.listener_count(), 1);

    task.abort();
    let _ = task.await;
    assert_eq!(hub.listener_count(), 0);
}
