//! Races the queuing subsystem must survive: parallel
//! senders, parallel publishers, listener toggling under load, and
//! multiple middleware instances in one process.

#[cfg(test)]
mod tests {
    use crate::integration::support::{init_tracing, wait_until};
    use rand::Rng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use viaduct_core::adapters::binding::{bind_service, bind_subscription, send_request};
    use viaduct_core::{ops, ClientState, MessageRecord, ServiceState, SubscriptionState};
    use viaduct_transport::{InMemoryTransport, SamplePayload};
    use viaduct_types::{GlobalId, InstanceToken, QosProfile};

    #[test]
    fn test_racing_senders_get_sequence_numbers_0_1_2() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();

        let service = Arc::new(ServiceState::new(token, "race/service", QosProfile::default()));
        let _binding = bind_service(&transport, &service);
        let client = Arc::new(ClientState::new(token, "race/service", QosProfile::default()));

        let transport = Arc::new(transport);
        let senders: Vec<_> = (0..3)
            .map(|n| {
                let transport = Arc::clone(&transport);
                let client = Arc::clone(&client);
                std::thread::spawn(move || send_request(&transport, &client, vec![n]))
            })
            .collect();

        let sequences: HashSet<u64> = senders.into_iter().map(|t| t.join().unwrap()).collect();
        assert_eq!(sequences, HashSet::from([0, 1, 2]));

        // All three land in the service's FIFO, each with its own number.
        let mut delivered = HashSet::new();
        assert!(wait_until(|| {
            while let Some(taken) = ops::take_request(&service, token).unwrap() {
                delivered.insert(taken.sequence_number);
            }
            delivered.len() == 3
        }));
        assert_eq!(delivered, HashSet::from([0, 1, 2]));
    }

    #[test]
    fn test_parallel_publishers_lose_nothing_within_depth() {
        init_tracing();
        let transport = Arc::new(InMemoryTransport::new());
        let token = InstanceToken::generate();

        const PUBLISHERS: usize = 4;
        const PER_PUBLISHER: usize = 100;

        let subscription = Arc::new(SubscriptionState::new(
            token,
            "race/firehose",
            QosProfile::with_depth(PUBLISHERS * PER_PUBLISHER),
        ));
        let _binding = bind_subscription(&transport, &subscription);

        let delivered = Arc::new(AtomicUsize::new(0));
        let delivered_in = Arc::clone(&delivered);
        subscription.set_data_listener(Some(Arc::new(move |count| {
            delivered_in.fetch_add(count, Ordering::SeqCst);
        })));

        let publishers: Vec<_> = (0..PUBLISHERS)
            .map(|_| {
                let transport = Arc::clone(&transport);
                std::thread::spawn(move || {
                    let publisher = transport.declare_publisher("race/firehose");
                    let mut rng = rand::thread_rng();
                    for _ in 0..PER_PUBLISHER {
                        let payload: Vec<u8> = (0..rng.gen_range(1..64)).map(|_| rng.gen()).collect();
                        publisher.put(payload);
                    }
                })
            })
            .collect();
        for handle in publishers {
            handle.join().unwrap();
        }

        assert!(wait_until(|| {
            delivered.load(Ordering::SeqCst) == PUBLISHERS * PER_PUBLISHER
        }));

        let mut drained = 0;
        while subscription.take_message().is_some() {
            drained += 1;
        }
        assert_eq!(drained, PUBLISHERS * PER_PUBLISHER);
    }

    #[test]
    fn test_listener_toggling_never_loses_events() {
        init_tracing();
        let token = InstanceToken::generate();
        let subscription = Arc::new(SubscriptionState::new(
            token,
            "race/toggle",
            QosProfile::with_depth(4_000),
        ));

        const THREADS: usize = 4;
        const PER_THREAD: usize = 250;

        let total = Arc::new(AtomicUsize::new(0));

        let recorders: Vec<_> = (0..THREADS)
            .map(|_| {
                let subscription = Arc::clone(&subscription);
                std::thread::spawn(move || {
                    for n in 0..PER_THREAD {
                        let payload = SamplePayload::new(
                            vec![n as u8],
                            GlobalId::generate(),
                            n as u64,
                        );
                        subscription.push_message(MessageRecord::new(payload, n as u64));
                    }
                })
            })
            .collect();

        // Toggle the listener while deliveries are racing in.
        for _ in 0..50 {
            let total_in = Arc::clone(&total);
            subscription.set_data_listener(Some(Arc::new(move |count| {
                total_in.fetch_add(count, Ordering::SeqCst);
            })));
            subscription.set_data_listener(None);
        }
        for handle in recorders {
            handle.join().unwrap();
        }

        // A final registration flushes whatever accumulated; the grand
        // total must account for every delivery exactly once.
        let total_in = Arc::clone(&total);
        subscription.set_data_listener(Some(Arc::new(move |count| {
            total_in.fetch_add(count, Ordering::SeqCst);
        })));

        assert_eq!(total.load(Ordering::SeqCst), THREADS * PER_THREAD);
    }

    #[test]
    fn test_two_instances_coexist_without_crosstalk() {
        init_tracing();

        struct Instance {
            token: InstanceToken,
            transport: InMemoryTransport,
            subscription: Arc<SubscriptionState>,
            _binding: viaduct_transport::SubscriberHandle,
        }

        let instance = || {
            let token = InstanceToken::generate();
            let transport = InMemoryTransport::new();
            let subscription = Arc::new(SubscriptionState::new(
                token,
                "shared/name",
                QosProfile::default(),
            ));
            let binding = bind_subscription(&transport, &subscription);
            Instance {
                token,
                transport,
                subscription,
                _binding: binding,
            }
        };

        let a = instance();
        let b = instance();

        a.transport
            .declare_publisher("shared/name")
            .put(b"only for a".to_vec());

        assert!(wait_until(|| !a.subscription.message_queue_is_empty()));
        assert!(b.subscription.message_queue_is_empty());

        // Handles do not validate across instances.
        assert!(ops::take_message(&a.subscription, b.token).is_err());
        let record = ops::take_message(&a.subscription, a.token)
            .unwrap()
            .expect("queued message");
        assert_eq!(record.payload().bytes(), b"only for a");
    }
}
