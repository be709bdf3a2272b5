//! Drives a real `NodeServer` over TCP with the client library.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use shardline_client::{
    AccountId, BackoffPolicy, Connection, Emulator, EmulatorConfig, Error, SecretKey, Status, TransportError,
};
use shardline_node::server::NodeServer;

const OPERATOR: AccountId = AccountId::simple(2);
const NODE: AccountId = AccountId::simple(3);

struct Running {
    addr: SocketAddr,
    emulator: Emulator,
    operator_key: SecretKey,
    stop: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

async fn start() -> Running {
    let operator_key = SecretKey::generate();
    let emulator = Emulator::new(EmulatorConfig {
        consensus_polls: Some(0),
        ..EmulatorConfig::default()
    });
    emulator.create_account(OPERATOR, operator_key.public(), 10_000);

    let server = NodeServer::bind("127.0.0.1:0".parse().unwrap(), emulator.clone())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.serve(async {
        let _ = stopped.await;
    }));
    Running {
        addr,
        emulator,
        operator_key,
        stop,
        task,
    }
}

#[tokio::test]
async fn create_transfer_and_query_over_tcp() {
    let node = start().await;
    let connection = Connection::open(&node.addr.to_string()).await.unwrap();
    let fast = BackoffPolicy::fixed(Duration::from_millis(10), 20);

    let new_key = SecretKey::generate();
    let created = connection
        .create_account()
        .operator(OPERATOR)
        .node(NODE)
        .key(new_key.public())
        .initial_balance(1_000)
        .sign(&node.operator_key)
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(created.precheck, Status::Ok);
    let outcome = created.resolver(&connection).with_policy(fast.clone()).resolve().await.unwrap();
    let new_account = outcome.account_id().unwrap();

    let moved = connection
        .crypto_transfer()
        .operator(OPERATOR)
        .node(NODE)
        .transfer(new_account, -400)
        .transfer(OPERATOR, 400)
        .sign(&node.operator_key)
        .unwrap()
        .sign(&new_key)
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(moved.precheck, Status::Ok);
    assert!(moved.resolver(&connection).with_policy(fast).resolve().await.unwrap().is_success());

    let balance = connection.get_account_balance(new_account).answer().await.unwrap();
    assert_eq!(balance, 600);
    assert_eq!(node.emulator.balance(OPERATOR), Some(10_000 - 1_000 - 10 - 10 + 400));

    let cost = connection.get_account_balance(new_account).cost().await.unwrap();
    assert_eq!(cost.cost, node.emulator.config().query_cost);

    let info = connection.get_account_info(new_account).answer().await.unwrap();
    assert_eq!(info.key, new_key.public());
    assert_eq!(info.balance, 600);

    let record = moved.record(&connection).answer().await.unwrap();
    assert_eq!(record.transaction_id, moved.id);
    assert_eq!(record.net_change(new_account), -400);
    assert_eq!(record.transaction_hash.len(), 48);

    connection.close().await;
    let _ = node.stop.send(());
    node.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn precheck_failures_cross_the_wire() {
    let node = start().await;
    let connection = Connection::open(&node.addr.to_string()).await.unwrap();

    let response = connection
        .create_account()
        .operator(OPERATOR)
        .node(AccountId::simple(99))
        .key(SecretKey::generate().public())
        .sign(&node.operator_key)
        .unwrap()
        .execute()
        .await
        .unwrap();
    assert_eq!(response.precheck, Status::InvalidNodeAccount);

    let missing = connection.get_account_balance(AccountId::simple(404)).answer().await;
    assert!(matches!(missing, Err(Error::PreCheck(Status::InvalidAccountId))));

    let _ = node.stop.send(());
}

#[tokio::test]
async fn raw_lines_get_json_rpc_errors() {
    let node = start().await;
    let stream = TcpStream::connect(node.addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write.write_all(b"garbage\n").await.unwrap();
    let reply: serde_json::Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["error"]["code"], -32700);

    write
        .write_all(b"{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ledger_burn\",\"params\":{}}\n")
        .await
        .unwrap();
    let reply: serde_json::Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
    assert_eq!(reply["id"], 3);
    assert_eq!(reply["error"]["code"], -32601);

    let _ = node.stop.send(());
}

#[tokio::test]
async fn unreachable_node_is_a_connection_error() {
    let node = start().await;
    let addr = node.addr.to_string();
    let _ = node.stop.send(());
    node.task.await.unwrap().unwrap();

    match Connection::open(&addr).await {
        Err(Error::Connection { address, source }) => {
            assert_eq!(address, addr);
            assert!(matches!(source, TransportError::Io(_) | TransportError::Unreachable));
        }
        other => panic!("unexpected {other:?}"),
    }
}
