mod common;

use std::sync::{Arc, Mutex};

use common::{account, deterministic_session, drain, error_messages, pump, session_with};
use wallet_bridge_adapters::{BridgeAdapterConfig, BridgeCall, Eip1193Bridge, RuntimeProfile};
use wallet_bridge_core::{
    BridgePort, CallbackRoute, Delivery, EntryPoint, ErrorKind, PortError, RpcResponse, SessionEvent,
    TransactionRequest, SHUTDOWN_MESSAGE,
};

type Log = Arc<Mutex<Vec<String>>>;

fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().expect("log lock").clone()
}

#[test]
fn connect_then_balance_reaches_subscribers() {
    let (session, rx) = deterministic_session();

    session.connect(None).expect("connect");
    assert_eq!(pump(&session), 1);
    assert!(session.is_connected());
    assert_eq!(session.current_address().as_deref(), Some(account()));
    assert_eq!(session.current_chain_id().as_deref(), Some("0xaa36a7"));

    session.get_balance(None).expect("balance");
    assert_eq!(pump(&session), 1);

    let events = drain(&rx);
    assert_eq!(events.len(), 2);
    match &events[0] {
        SessionEvent::WalletConnected(result) => {
            assert!(result.success);
            assert_eq!(result.address.as_deref(), Some(account()));
        }
        other => panic!("unexpected event {other:?}"),
    }
    match &events[1] {
        SessionEvent::BalanceReceived(balance) => {
            assert_eq!(balance.balance, "0x0de0b6b3a7640000");
            assert_eq!(balance.formatted_balance, "1");
            assert_eq!(balance.currency_symbol, "SepoliaETH");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn rejected_connection_leaves_session_disconnected() {
    let (session, rx) = deterministic_session();
    session
        .bridge
        .debug_fail_next("User rejected the request.")
        .expect("arm failure");

    session.connect(None).expect("connect dispatch");
    pump(&session);

    assert!(!session.is_connected());
    assert_eq!(
        error_messages(&drain(&rx)),
        vec!["Wallet connection failed: User rejected the request.".to_owned()]
    );
}

#[test]
fn locked_wallet_reports_missing_accounts() {
    let (session, rx) = deterministic_session();
    session.bridge.debug_set_accounts(vec![]).expect("clear accounts");

    session.connect(None).expect("connect dispatch");
    pump(&session);

    assert_eq!(
        error_messages(&drain(&rx)),
        vec!["Wallet connection failed: no accounts available; unlock wallet".to_owned()]
    );
}

#[test]
fn unavailable_provider_is_never_called() {
    let (session, rx) = deterministic_session();
    session.bridge.debug_set_available(false).expect("toggle");

    let err = session.connect(None).expect_err("provider missing");
    assert!(matches!(err, PortError::ProviderUnavailable));
    assert!(session.bridge.calls().expect("calls").is_empty());

    let events = drain(&rx);
    assert!(matches!(
        &events[..],
        [SessionEvent::Error { kind: ErrorKind::ProviderUnavailable, .. }]
    ));
}

#[test]
fn chain_queries_follow_requested_chain() {
    let (session, _rx) = deterministic_session();
    session.connect(Some("0x2105")).expect("connect");
    pump(&session);
    assert_eq!(session.current_chain_id().as_deref(), Some("0x2105"));

    let results = log();
    for method in ["eth_chainId", "net_version"] {
        let sink = Arc::clone(&results);
        session
            .send_rpc(
                method,
                vec![],
                move |resp: RpcResponse| {
                    sink.lock()
                        .expect("log lock")
                        .push(resp.result.unwrap_or_default());
                },
                |e| panic!("unexpected error {e}"),
            )
            .expect("send");
    }
    assert_eq!(pump(&session), 2);
    assert_eq!(entries(&results), vec!["0x2105".to_owned(), "8453".to_owned()]);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn unsupported_method_answers_with_application_error() {
    let (session, _rx) = deterministic_session();
    let codes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&codes);

    session
        .send_rpc(
            "eth_mine",
            vec![],
            move |resp: RpcResponse| {
                let code = resp.effective_error().map(|e| e.code);
                sink.lock().expect("codes lock").push(code);
            },
            |e| panic!("unexpected error {e}"),
        )
        .expect("send");
    pump(&session);

    assert_eq!(*codes.lock().expect("codes lock"), vec![Some(-32601)]);
}

#[test]
fn transaction_is_encoded_and_hashed() {
    let (session, _rx) = deterministic_session();
    let hashes = log();
    let sink = Arc::clone(&hashes);

    session
        .send_transaction(
            "0x2000000000000000000000000000000000000002",
            "0x2386f26fc10000",
            None,
            move |resp: RpcResponse| {
                sink.lock()
                    .expect("log lock")
                    .push(resp.result.unwrap_or_default());
            },
            |e| panic!("unexpected error {e}"),
        )
        .expect("send transaction");
    pump(&session);

    let hashes = entries(&hashes);
    assert_eq!(hashes.len(), 1);
    assert!(hashes[0].starts_with("0x"));
    assert_eq!(hashes[0].len(), 66);

    let calls = session.bridge.calls().expect("calls");
    let Some(BridgeCall::SendRpc { request_json, .. }) = calls.last() else {
        panic!("expected an rpc call, got {calls:?}");
    };
    let request: serde_json::Value = serde_json::from_str(request_json).expect("request json");
    assert_eq!(request["method"], "eth_sendTransaction");
    let tx: TransactionRequest = serde_json::from_str(
        request["params"][0].as_str().expect("tx param"),
    )
    .expect("tx json");
    assert_eq!(tx.data, "0x");
    assert_eq!(tx.value, "0x2386f26fc10000");
}

#[test]
fn balance_failure_is_reported_as_text() {
    let (session, rx) = deterministic_session();
    session.bridge.debug_fail_next("rpc node offline").expect("arm");

    session.get_balance(Some(account())).expect("balance dispatch");
    pump(&session);

    assert_eq!(
        error_messages(&drain(&rx)),
        vec!["Balance request failed: rpc node offline".to_owned()]
    );
}

#[test]
fn rpc_failure_reaches_error_callback() {
    let (session, _rx) = deterministic_session();
    session.bridge.debug_fail_next("node offline").expect("arm");
    let errors = log();
    let sink = Arc::clone(&errors);

    session
        .send_rpc(
            "eth_blockNumber",
            vec![],
            |_| panic!("unexpected success"),
            move |e| sink.lock().expect("log lock").push(e),
        )
        .expect("send");
    pump(&session);

    assert_eq!(entries(&errors), vec!["node offline".to_owned()]);
    assert_eq!(session.pending_count(), 0);
}

#[test]
fn malformed_request_answer_is_unmatched() {
    let (session, rx) = deterministic_session();

    session
        .bridge
        .send_rpc("not json", &CallbackRoute::rpc(session.origin()))
        .expect("bridge accepts call");
    pump(&session);

    assert_eq!(session.unmatched_responses(), 1);
    let events = drain(&rx);
    assert!(matches!(
        &events[..],
        [SessionEvent::Error { kind: ErrorKind::UnmatchedResponse, .. }]
    ));
}

#[test]
fn shutdown_fails_unanswered_requests_once() {
    let (session, _rx) = deterministic_session();
    let errors = log();
    let sink = Arc::clone(&errors);

    session
        .send_rpc(
            "eth_chainId",
            vec![],
            |_| panic!("answer must not arrive after shutdown"),
            move |e| sink.lock().expect("log lock").push(e),
        )
        .expect("send");
    assert_eq!(session.bridge.queued_deliveries().expect("queued"), 1);

    assert_eq!(session.shutdown().expect("shutdown"), 1);
    pump(&session);

    assert_eq!(entries(&errors), vec![SHUTDOWN_MESSAGE.to_owned()]);
    assert_eq!(session.shutdown().expect("second shutdown"), 0);
}

#[test]
fn production_profile_without_proxy_disables_bridge() {
    let cfg = BridgeAdapterConfig {
        runtime_profile: RuntimeProfile::Production,
        eip1193_proxy_url: None,
        ..BridgeAdapterConfig::default()
    };
    let bridge = Eip1193Bridge::with_config(cfg);
    assert_eq!(bridge.mode_name(), "disabled");
    assert!(!bridge.is_available());

    let err = bridge
        .connect("0x1", &CallbackRoute::connection("host"))
        .expect_err("runtime should be required");
    assert!(matches!(err, PortError::Policy(_)));

    let (session, _rx) = session_with(bridge);
    assert!(matches!(
        session.connect(None),
        Err(PortError::ProviderUnavailable)
    ));
}

#[test]
fn development_profile_falls_back_to_deterministic() {
    let bridge = Eip1193Bridge::with_config(BridgeAdapterConfig::default());
    assert_eq!(bridge.mode_name(), "deterministic");
    assert!(bridge.is_available());
}

#[test]
fn queued_answers_for_another_origin_are_ignored() {
    let (session, rx) = deterministic_session();
    session
        .bridge
        .debug_push_delivery(Delivery {
            origin: "other-host".to_owned(),
            entry: EntryPoint::ConnectionSuccess,
            payload: account().to_owned(),
        })
        .expect("push foreign");
    session
        .bridge
        .debug_push_delivery(Delivery {
            origin: session.origin().to_owned(),
            entry: EntryPoint::BalanceError,
            payload: "gateway timeout".to_owned(),
        })
        .expect("push own");

    assert_eq!(pump(&session), 2);
    assert!(!session.is_connected());
    assert_eq!(
        error_messages(&drain(&rx)),
        vec!["Balance request failed: gateway timeout".to_owned()]
    );
}
