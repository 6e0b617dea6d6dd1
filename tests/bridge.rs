use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use tunnel_events::{
    BridgeState, ConnectionState, EventNotifier, NotifyError, StreamConfig, SubscriberId,
    TransportProtocol, TunnelConfig, TunnelEndpoint, TunnelStateTransition, TunnelType,
};

fn sample_config() -> TunnelConfig {
    TunnelConfig {
        addresses: vec![IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))],
        dns_servers: vec![IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))],
        routes: vec!["0.0.0.0/0".parse().unwrap()],
        mtu: 1380,
    }
}

async fn wait_for_subscribers<T: Clone>(n: &EventNotifier<T>, count: usize) {
    while n.subscriber_count() < count {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn config_reaches_callback_and_stream_unchanged() {
    let n = Arc::new(EventNotifier::<TunnelConfig>::new());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    n.subscribe(SubscriberId::generate(), move |cfg| sink.lock().unwrap().push(cfg));

    let mut stream = n.open_stream();
    let consumer = tokio::spawn(async move { stream.next().await });
    wait_for_subscribers(&n, 2).await;

    let emitter = {
        let n = Arc::clone(&n);
        thread::spawn(move || n.notify(sample_config()))
    };
    emitter.join().unwrap().unwrap();

    assert_eq!(consumer.await.unwrap(), Some(sample_config()));
    assert_eq!(*seen.lock().unwrap(), vec![sample_config()]);
    assert_eq!(n.latest(), Some(sample_config()));
    assert_eq!(n.subscriber_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_consumer_observes_only_earlier_values() {
    let n = Arc::new(EventNotifier::<ConnectionState>::new());
    let token = CancellationToken::new();
    let mut stream = n.open_stream().with_cancellation(token.clone());

    let (first_tx, first_rx) = tokio::sync::oneshot::channel();
    let consumer = tokio::spawn(async move {
        let mut observed = Vec::new();
        let mut first_tx = Some(first_tx);
        while let Some(state) = stream.next().await {
            observed.push(state);
            if let Some(tx) = first_tx.take() {
                let _ = tx.send(());
            }
        }
        (observed, stream.state())
    });
    wait_for_subscribers(&n, 1).await;

    n.notify(ConnectionState::Bound).unwrap();
    first_rx.await.unwrap();

    token.cancel();
    let (observed, state) = consumer.await.unwrap();
    n.notify(ConnectionState::Unbound).unwrap();

    assert_eq!(observed, vec![ConnectionState::Bound]);
    assert_eq!(state, BridgeState::Cancelled);
    assert_eq!(n.subscriber_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_streams_each_see_every_transition_in_order() {
    let n = Arc::new(EventNotifier::<TunnelStateTransition>::new());
    let endpoint = TunnelEndpoint::new(
        IpAddr::V4(Ipv4Addr::new(185, 65, 134, 1)),
        51820,
        TransportProtocol::Udp,
    );
    let script = vec![
        TunnelStateTransition::Connecting {
            endpoint,
            tunnel_type: TunnelType::WireGuard,
        },
        TunnelStateTransition::Connected {
            endpoint,
            tunnel_type: TunnelType::WireGuard,
        },
        TunnelStateTransition::Disconnected,
    ];

    let mut consumers = Vec::new();
    for _ in 0..4 {
        let stream = n.open_stream_with(StreamConfig::default().with_capacity(8));
        let len = script.len();
        consumers.push(tokio::spawn(async move {
            stream.take(len).collect::<Vec<_>>().await
        }));
    }
    wait_for_subscribers(&n, 4).await;

    for t in &script {
        n.notify(t.clone()).unwrap();
    }

    for c in consumers {
        assert_eq!(c.await.unwrap(), script);
    }
    assert!(!n.has_subscribers());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_subscriber_does_not_starve_stream() {
    let n = Arc::new(EventNotifier::<u32>::new());
    let calls = Arc::new(AtomicUsize::new(0));

    n.subscribe(SubscriberId::from(0), |_| panic!("broken ui"));
    let counter = Arc::clone(&calls);
    n.subscribe(SubscriberId::generate(), move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut stream = n.open_stream();
    let consumer = tokio::spawn(async move { stream.next().await });
    wait_for_subscribers(&n, 3).await;

    let err = n.notify(7).unwrap_err();
    match &err {
        NotifyError::CallbackPanicked { attempted, failures } => {
            assert_eq!(*attempted, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].message, "broken ui");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(consumer.await.unwrap(), Some(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_notifier_ends_pending_consumer() {
    let n = Arc::new(EventNotifier::<u32>::new());
    let mut stream = n.open_stream();
    let consumer = tokio::spawn(async move {
        let first = stream.next().await;
        let end = stream.next().await;
        (first, end, stream.state())
    });
    wait_for_subscribers(&n, 1).await;

    n.notify(1).unwrap();
    drop(n);

    let (first, end, state) = consumer.await.unwrap();
    assert_eq!(first, Some(1));
    assert_eq!(end, None);
    assert_eq!(state, BridgeState::Exhausted);
}
