//! wallet-bridge: connects to the configured EIP-1193 provider and prints
//! the account balance.
//!
//! Usage: `wallet-bridge [address]`. Without an address the connected
//! account is queried.

use std::time::Duration;

use eyre::{eyre, WrapErr};

use wallet_bridge_adapters::{BridgeAdapterConfig, Eip1193Bridge};
use wallet_bridge_core::{RpcResponse, SessionEvent, WalletSession};

type Session = WalletSession<Eip1193Bridge>;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = BridgeAdapterConfig::from_env();
    let network = config
        .network_config()
        .wrap_err("failed to load network config")?;
    let bridge = Eip1193Bridge::with_config(config.clone());
    tracing::info!(
        mode = bridge.mode_name(),
        network = %network.display_name(),
        "Starting wallet-bridge"
    );

    let session = WalletSession::init_with_origin(bridge, network, &config.origin);
    session.subscribe(print_event)?;
    let address = std::env::args().nth(1);

    let outcome = run(&session, address.as_deref());
    let failed = session.shutdown()?;
    if failed > 0 {
        tracing::warn!(failed, "requests left unanswered at exit");
    }
    outcome
}

fn run(session: &Session, address: Option<&str>) -> eyre::Result<()> {
    session
        .connect(None)
        .wrap_err("wallet connection could not be started")?;
    pump(session)?;
    if !session.is_connected() && address.is_none() {
        return Err(eyre!("wallet did not connect and no address was given"));
    }

    session.send_rpc(
        "eth_chainId",
        vec![],
        |resp: RpcResponse| match resp.effective_result() {
            Some(chain) => println!("provider chain: {chain}"),
            None => println!("provider chain unknown"),
        },
        |e| tracing::warn!(error = %e, "chain id query failed"),
    )?;
    session.get_balance(address)?;
    pump(session)?;
    Ok(())
}

/// Hands provider answers to the session until the bridge queue is empty.
fn pump(session: &Session) -> eyre::Result<usize> {
    let mut total = 0;
    loop {
        if !session.bridge.wait_settled(SETTLE_TIMEOUT)? {
            tracing::warn!("provider calls still running, delivering what has arrived");
        }
        let deliveries = session.bridge.drain_deliveries()?;
        if deliveries.is_empty() {
            return Ok(total);
        }
        total += session.deliver_all(deliveries);
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::WalletConnected(result) => println!(
            "connected: {} on chain {}",
            result.address.as_deref().unwrap_or("?"),
            result.chain_id.as_deref().unwrap_or("?")
        ),
        SessionEvent::WalletDisconnected(reason) => println!("disconnected: {reason}"),
        SessionEvent::BalanceReceived(balance) => println!(
            "balance: {} {} ({} wei)",
            balance.formatted_balance, balance.currency_symbol, balance.balance
        ),
        SessionEvent::Error { kind, message } => {
            tracing::error!(?kind, "{message}");
        }
    }
}
