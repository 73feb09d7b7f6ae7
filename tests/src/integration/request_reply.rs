//! Request/response correlation: the FIFO → correlation-table handoff,
//! out-of-order answers, stray replies, and error-flagged discards.

#[cfg(test)]
mod tests {
    use crate::integration::support::{init_tracing, wait_until};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use viaduct_core::adapters::binding::{bind_service, send_request};
    use viaduct_core::{ops, ClientState, ServiceState, TakenRequest};
    use viaduct_transport::{InMemoryTransport, ServiceTypeSupport, TypeSupport};
    use viaduct_types::{InstanceToken, QosProfile};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct SumRequest {
        a: i64,
        b: i64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct SumResponse {
        sum: i64,
        sequence: i64,
    }

    fn type_support() -> ServiceTypeSupport<SumRequest, SumResponse> {
        ServiceTypeSupport::new()
    }

    struct Fixture {
        transport: InMemoryTransport,
        token: InstanceToken,
        service: Arc<ServiceState>,
        client: Arc<ClientState>,
        _binding: viaduct_transport::QueryableHandle,
    }

    fn fixture(key_expr: &str) -> Fixture {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();
        let service = Arc::new(ServiceState::new(token, key_expr, QosProfile::default()));
        let binding = bind_service(&transport, &service);
        let client = Arc::new(ClientState::new(token, key_expr, QosProfile::default()));
        Fixture {
            transport,
            token,
            service,
            client,
            _binding: binding,
        }
    }

    fn take_request_blocking(fixture: &Fixture) -> TakenRequest {
        let mut taken = None;
        assert!(wait_until(|| {
            taken = ops::take_request(&fixture.service, fixture.token).unwrap();
            taken.is_some()
        }));
        taken.unwrap()
    }

    #[test]
    fn test_request_reply_roundtrip() {
        let fixture = fixture("math/sum");
        let ts = type_support();

        let request = SumRequest { a: 20, b: 22 };
        let sequence = send_request(
            &fixture.transport,
            &fixture.client,
            ts.request.encode(&request).unwrap(),
        );
        assert_eq!(sequence, 0);

        // Service side: take, decode, answer.
        let taken = take_request_blocking(&fixture);
        assert_eq!(taken.sequence_number, 0);
        assert_eq!(taken.client_gid, fixture.client.gid());
        let decoded = ts.request.decode(taken.payload.bytes()).unwrap();
        assert_eq!(decoded, request);

        let response = SumResponse {
            sum: decoded.a + decoded.b,
            sequence: taken.sequence_number,
        };
        assert!(ops::send_response(
            &fixture.service,
            fixture.token,
            taken.sequence_number,
            ts.response.encode(&response).unwrap(),
        )
        .unwrap());

        // Client side: the reply arrives on the transport thread.
        assert!(wait_until(|| !fixture.client.reply_queue_is_empty()));
        let reply = ops::take_response(&fixture.client, fixture.token)
            .unwrap()
            .expect("queued reply");
        assert_eq!(reply.payload().publisher_gid(), fixture.service.gid());
        let answer = ts.response.decode(reply.payload().bytes()).unwrap();
        assert_eq!(answer, SumResponse { sum: 42, sequence: 0 });
    }

    #[test]
    fn test_answers_out_of_order_still_correlate() {
        let fixture = fixture("math/slow-sum");
        let ts = type_support();

        for n in 0..3 {
            send_request(
                &fixture.transport,
                &fixture.client,
                ts.request.encode(&SumRequest { a: n, b: n }).unwrap(),
            );
        }

        // Park all three before answering any.
        let mut parked = HashMap::new();
        for _ in 0..3 {
            let taken = take_request_blocking(&fixture);
            let request = ts.request.decode(taken.payload.bytes()).unwrap();
            parked.insert(taken.sequence_number, request);
        }
        assert_eq!(fixture.service.pending_count(), 3);

        // Answer newest-first.
        for sequence in [2, 1, 0] {
            let request = &parked[&sequence];
            let response = SumResponse {
                sum: request.a + request.b,
                sequence,
            };
            assert!(ops::send_response(
                &fixture.service,
                fixture.token,
                sequence,
                ts.response.encode(&response).unwrap(),
            )
            .unwrap());
        }
        assert_eq!(fixture.service.pending_count(), 0);

        // Replies arrive in answer order; each still names its request.
        let mut received = Vec::new();
        for _ in 0..3 {
            assert!(wait_until(|| !fixture.client.reply_queue_is_empty()));
            let reply = ops::take_response(&fixture.client, fixture.token)
                .unwrap()
                .expect("queued reply");
            received.push(ts.response.decode(reply.payload().bytes()).unwrap());
        }

        assert_eq!(
            received.iter().map(|r| r.sequence).collect::<Vec<_>>(),
            vec![2, 1, 0]
        );
        for response in received {
            assert_eq!(response.sum, response.sequence * 2);
        }
    }

    #[test]
    fn test_stray_second_response_is_reported_not_sent() {
        let fixture = fixture("math/once");
        let ts = type_support();

        send_request(
            &fixture.transport,
            &fixture.client,
            ts.request.encode(&SumRequest { a: 1, b: 2 }).unwrap(),
        );
        let taken = take_request_blocking(&fixture);

        let bytes = ts
            .response
            .encode(&SumResponse { sum: 3, sequence: taken.sequence_number })
            .unwrap();
        assert!(ops::send_response(
            &fixture.service,
            fixture.token,
            taken.sequence_number,
            bytes.clone(),
        )
        .unwrap());

        // Nothing pending anymore: the stray answer is a clean `false`.
        assert!(!ops::send_response(
            &fixture.service,
            fixture.token,
            taken.sequence_number,
            bytes,
        )
        .unwrap());

        // Exactly one reply reaches the client.
        assert!(wait_until(|| !fixture.client.reply_queue_is_empty()));
        assert!(fixture.client.take_reply().is_some());
        std::thread::sleep(Duration::from_millis(100));
        assert!(fixture.client.take_reply().is_none());
    }

    #[test]
    fn test_error_reply_never_queued() {
        init_tracing();
        let transport = InMemoryTransport::new();
        let token = InstanceToken::generate();

        // No queryable on this key: the transport answers with an
        // error-flagged reply, which the adapter discards.
        let client = Arc::new(ClientState::new(
            token,
            "math/nowhere",
            QosProfile::default(),
        ));
        let sequence = send_request(&transport, &client, b"anyone?".to_vec());
        assert_eq!(sequence, 0);

        std::thread::sleep(Duration::from_millis(150));
        assert!(client.reply_queue_is_empty());
        assert!(ops::take_response(&client, token).unwrap().is_none());
    }

    #[test]
    fn test_service_keeps_accepting_while_requests_pend() {
        let fixture = fixture("math/pipelined");
        let ts = type_support();

        send_request(
            &fixture.transport,
            &fixture.client,
            ts.request.encode(&SumRequest { a: 1, b: 1 }).unwrap(),
        );
        let first = take_request_blocking(&fixture);

        // With the first request parked, a second one flows normally.
        send_request(
            &fixture.transport,
            &fixture.client,
            ts.request.encode(&SumRequest { a: 2, b: 2 }).unwrap(),
        );
        let second = take_request_blocking(&fixture);
        assert_eq!(fixture.service.pending_count(), 2);
        assert_ne!(first.sequence_number, second.sequence_number);
    }
}
