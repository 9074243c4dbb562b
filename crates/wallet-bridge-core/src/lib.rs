pub mod balance;
pub mod domain;
pub mod events;
pub mod pending;
pub mod ports;
pub mod session;
pub mod state_machine;

pub use balance::{format_balance, format_wei, format_wei_hex, parse_wei_hex, FormattedBalance};
pub use domain::{
    BalanceResult, NetworkConfig, RequestId, RpcErrorObject, RpcRequest, RpcResponse,
    SessionState, TransactionRequest, WalletConnectionResult, JSONRPC_VERSION,
};
pub use events::{ErrorKind, EventBus, SessionEvent, SubscriptionId};
pub use pending::{ErrorCallback, IdAllocator, PendingEntry, PendingRequestTable, SuccessCallback};
pub use ports::{BridgePort, CallbackRoute, Delivery, EntryPoint, PayloadFormat, PortError};
pub use session::{WalletSession, DEFAULT_ORIGIN, SHUTDOWN_MESSAGE};
pub use state_machine::{session_transition, SessionAction, SessionStatus, StateTransition};
