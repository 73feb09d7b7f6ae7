//! End-to-end delivery: publish → transport thread → adapter → bounded
//! queue → synchronous take, with notifier and wait-signal plumbing.

#[cfg(test)]
mod tests {
    use crate::integration::support::{init_tracing, wait_until};
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc};
    use std::time::Duration;
    use viaduct_core::adapters::binding::bind_subscription;
    use viaduct_core::{ops, EventSource, PublisherState, SubscriptionState, WaitSignal};
    use viaduct_transport::{BincodeTypeSupport, InMemoryTransport, TypeSupport};
    use viaduct_types::{
        AdapterError, EventKind, EventStatus, InstanceToken, QosProfile,
    };

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Telemetry {
        sensor: String,
        reading: f64,
        sample_no: u32,
    }

    fn telemetry(sample_no: u32) -> Telemetry {
        Telemetry {
            sensor: "turbine-3/rpm".to_string(),
            reading: 1480.5 + f64::from(sample_no),
            sample_no,
        }
    }

    #[test]
    fn test_typed_publish_take_roundtrip() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();
        let type_support = BincodeTypeSupport::<Telemetry>::new();

        let subscription = Arc::new(SubscriptionState::new(
            token,
            "plant/turbine-3/rpm",
            QosProfile::default(),
        ));
        let _binding = bind_subscription(&transport, &subscription);

        let publisher = transport.declare_publisher("plant/turbine-3/rpm");
        let message = telemetry(1);
        publisher.put(type_support.encode(&message).unwrap());

        assert!(wait_until(|| !subscription.message_queue_is_empty()));

        let record = ops::take_message(&subscription, token)
            .unwrap()
            .expect("queued message");
        assert_eq!(record.publisher_gid(), publisher.gid());
        assert!(record.payload().source_timestamp() > 0);
        assert!(record.recv_timestamp() >= record.payload().source_timestamp());

        let decoded = type_support.decode(record.payload().bytes()).unwrap();
        assert_eq!(decoded, message);

        // Queue drained: the next take reports empty, not an error.
        assert!(ops::take_message(&subscription, token).unwrap().is_none());
    }

    #[test]
    fn test_depth_two_keeps_newest_two() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();
        let type_support = BincodeTypeSupport::<Telemetry>::new();

        let subscription = Arc::new(SubscriptionState::new(
            token,
            "plant/turbine-3/rpm",
            QosProfile::with_depth(2),
        ));
        let _binding = bind_subscription(&transport, &subscription);

        let delivered = Arc::new(AtomicUsize::new(0));
        let delivered_in = Arc::clone(&delivered);
        subscription.set_data_listener(Some(Arc::new(move |count| {
            delivered_in.fetch_add(count, Ordering::SeqCst);
        })));

        let publisher = transport.declare_publisher("plant/turbine-3/rpm");
        for sample_no in 1..=3 {
            publisher.put(type_support.encode(&telemetry(sample_no)).unwrap());
        }

        assert!(wait_until(|| delivered.load(Ordering::SeqCst) == 3));

        // Sample 1 was evicted; 2 and 3 remain, oldest first.
        let first = subscription.take_message().expect("first record");
        let second = subscription.take_message().expect("second record");
        assert_eq!(type_support.decode(first.payload().bytes()).unwrap().sample_no, 2);
        assert_eq!(type_support.decode(second.payload().bytes()).unwrap().sample_no, 3);
        assert!(subscription.take_message().is_none());
    }

    #[test]
    fn test_burst_before_listener_flushes_once() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();

        let subscription = Arc::new(SubscriptionState::new(
            token,
            "plant/burst",
            QosProfile::default(),
        ));
        let _binding = bind_subscription(&transport, &subscription);

        // Marker topic: the delivery worker runs jobs in order, so once
        // the marker lands every earlier publication has been queued.
        let marker = Arc::new(SubscriptionState::new(
            token,
            "plant/marker",
            QosProfile::default(),
        ));
        let _marker_binding = bind_subscription(&transport, &marker);

        let publisher = transport.declare_publisher("plant/burst");
        for n in 0..3u8 {
            publisher.put(vec![n]);
        }
        transport.declare_publisher("plant/marker").put(b"done".to_vec());
        assert!(wait_until(|| !marker.message_queue_is_empty()));

        let (tx, rx) = mpsc::channel();
        let tx_flush = tx.clone();
        subscription.set_data_listener(Some(Arc::new(move |count| {
            tx_flush.send(count).unwrap();
        })));

        // Accumulated burst arrives as a single flush of 3.
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 3);

        // From here every delivery dispatches directly with count 1.
        publisher.put(vec![9]);
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 1);
    }

    #[test]
    fn test_wait_signal_wakes_blocked_consumer() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();

        let subscription = Arc::new(SubscriptionState::new(
            token,
            "plant/blocking",
            QosProfile::default(),
        ));
        let _binding = bind_subscription(&transport, &subscription);

        let signal = Arc::new(WaitSignal::new());
        subscription.attach_condition(Arc::clone(&signal));

        let consumer = {
            let subscription = Arc::clone(&subscription);
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || {
                if !signal.wait_timeout(Duration::from_secs(5)) {
                    return None;
                }
                subscription.detach_condition();
                subscription.take_message()
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        transport
            .declare_publisher("plant/blocking")
            .put(b"wake up".to_vec());

        let record = consumer.join().unwrap().expect("woken consumer takes the record");
        assert_eq!(record.payload().bytes(), b"wake up");
    }

    #[test]
    fn test_two_subscriptions_each_get_the_sample() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();

        let first = Arc::new(SubscriptionState::new(
            token,
            "plant/shared",
            QosProfile::default(),
        ));
        let second = Arc::new(SubscriptionState::new(
            token,
            "plant/shared",
            QosProfile::default(),
        ));
        let _first_binding = bind_subscription(&transport, &first);
        let _second_binding = bind_subscription(&transport, &second);

        transport
            .declare_publisher("plant/shared")
            .put(b"fan-out".to_vec());

        assert!(wait_until(|| {
            !first.message_queue_is_empty() && !second.message_queue_is_empty()
        }));
        assert_eq!(first.take_message().unwrap().payload().bytes(), b"fan-out");
        assert_eq!(second.take_message().unwrap().payload().bytes(), b"fan-out");
    }

    #[test]
    fn test_qos_event_surface_end_to_end() {
        init_tracing();
        let token = InstanceToken::generate();
        let subscription = SubscriptionState::new(token, "plant/qos", QosProfile::default());

        // The graph layer reports an incompatibility.
        subscription
            .events()
            .record_status(
                EventKind::RequestedQosIncompatible,
                EventStatus::with_counts(1, 1, 1),
            )
            .unwrap();

        let status = ops::take_event(&subscription, token, EventKind::RequestedQosIncompatible)
            .unwrap()
            .expect("queued status");
        assert_eq!(status.total_count, 1);

        // The publisher-side kind is outside a subscription's set.
        let err =
            ops::take_event(&subscription, token, EventKind::OfferedQosIncompatible).unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedEvent { .. }));

        // Publishers mirror the arrangement for the offered-QoS kind.
        let publisher_state = PublisherState::new(
            token,
            "plant/qos",
            QosProfile::default(),
            viaduct_types::GlobalId::generate(),
        );
        publisher_state
            .events()
            .record_status(
                EventKind::OfferedQosIncompatible,
                EventStatus::with_counts(2, 1, 2),
            )
            .unwrap();
        let status = ops::take_event(&publisher_state, token, EventKind::OfferedQosIncompatible)
            .unwrap()
            .expect("queued status");
        assert_eq!(status.total_count, 2);
        assert!(
            ops::take_event(&publisher_state, token, EventKind::RequestedQosIncompatible).is_err()
        );
    }
}
