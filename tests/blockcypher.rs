//! BlockCypher adapter tests against a scripted HTTP transport, no network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network};
use serde_json::{json, Value};

use bitcoin_explorers::transport::{HttpResponse, HttpTransport};
use bitcoin_explorers::{BlockCypher, Explorer, ExplorerError, Result};

const URL: &str = "https://api.blockcypher.com/v1/btc/test3";
const ADDR_1: &str = "mgBCJAsvzgT2qNNeXsoECg2uPKrUsZ76up";
const ADDR_2: &str = "mmvP3mTe53qxHdPqXEvdu8WdC7GfQ2vmx5";
const TXID_A: &str = "d5512c404df9cbe7a9e91b5a2a3d27a7a162ae59a48ca522c5e33db586b873ca";
const TXID_B: &str = "e42447187db5a29d6db161661e4bc66d61c3e499690fe5ea47f87b79ca573986";
const P2PKH_SCRIPT: &str = "76a914073b7eae2823efa349e3b9155b8a735526463a0f88ac";
const RAW_TX: &str = "01000000015884e5db9de218238671572340b207ee85b628074e7e467096c267266baf77a4000000006a473044022013fa3089327b50263029265572ae1b022a91d10ac80eb4f32f291c914533670b02200d8a5ed5f62634a7e1a0dc9188a3cc460a986267ae4d58faf50c79105431327501210223078d2942df62c45621d209fab84ea9a7a23346201b7727b9b45a29c4e76f5effffffff0150690f00000000001976a9147821c0a3768aa9d1a37e16cf76002aef5373f1a888ac00000000";

#[derive(Debug, Clone, PartialEq)]
enum Recorded {
    Get(String),
    Post(String, Value),
}

/// Routes requests by exact URL; anything unrouted fails like a dead host.
/// Clones share state, so a test can hand one to the client and keep
/// another for assertions.
#[derive(Default, Clone)]
struct StubTransport {
    replies: Arc<Mutex<HashMap<String, (u16, String)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubTransport {
    fn new() -> Self {
        StubTransport::default()
    }

    fn reply(&self, url: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_string()));
    }

    fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn route(&self, url: &str) -> Result<HttpResponse> {
        match self.replies.lock().unwrap().get(url) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(ExplorerError::Transport(format!("no route to {}", url))),
        }
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded::Get(url.to_string()));
        self.route(url)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded::Post(url.to_string(), body.clone()));
        self.route(url)
    }
}

fn blockcypher(stub: &StubTransport) -> BlockCypher {
    BlockCypher::with_transport(URL, Network::Testnet, Box::new(stub.clone()))
}

fn address(value: &str) -> Address {
    value
        .parse::<Address<NetworkUnchecked>>()
        .unwrap()
        .require_network(Network::Testnet)
        .unwrap()
}

fn utxo_url(addr: &str) -> String {
    format!("{}/addrs/{}?unspentOnly=true&includeScript=true", URL, addr)
}

fn txref(tx_hash: &str, vout: u32, value: u64) -> Value {
    json!({
        "tx_hash": tx_hash,
        "block_height": 421776,
        "tx_input_n": -1,
        "tx_output_n": vout,
        "value": value,
        "ref_balance": value,
        "spent": false,
        "confirmations": 6,
        "confirmed": "2016-07-18T11:30:13Z",
        "script": P2PKH_SCRIPT
    })
}

#[tokio::test]
async fn test_fetch_queries_each_address_separately() {
    let stub = StubTransport::new();
    stub.reply(
        &utxo_url(ADDR_1),
        200,
        &json!({
            "address": ADDR_1,
            "txrefs": [txref(TXID_A, 0, 1080000)],
            "unconfirmed_txrefs": [txref(TXID_B, 1, 50000)]
        })
        .to_string(),
    );
    stub.reply(
        &utxo_url(ADDR_2),
        200,
        &json!({
            "address": ADDR_2,
            "txrefs": [txref(TXID_B, 0, 700)]
        })
        .to_string(),
    );

    let outputs = blockcypher(&stub)
        .fetch_unspent_outputs(&[address(ADDR_1), address(ADDR_2)])
        .await
        .unwrap();

    // First address first, confirmed before unconfirmed.
    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].txid.to_string(), TXID_A);
    assert_eq!(outputs[0].satoshis, 1080000);
    assert_eq!(outputs[1].txid.to_string(), TXID_B);
    assert_eq!(outputs[1].output_index, 1);
    assert_eq!(outputs[2].satoshis, 700);
    assert_eq!(
        outputs[0].address.as_ref().unwrap().to_string(),
        ADDR_1
    );

    assert_eq!(
        stub.recorded(),
        vec![
            Recorded::Get(utxo_url(ADDR_1)),
            Recorded::Get(utxo_url(ADDR_2)),
        ]
    );
}

#[tokio::test]
async fn test_missing_txref_arrays_mean_no_outputs() {
    let stub = StubTransport::new();
    stub.reply(
        &utxo_url(ADDR_1),
        200,
        &json!({ "address": ADDR_1, "txrefs": null }).to_string(),
    );

    let outputs = blockcypher(&stub)
        .fetch_unspent_outputs(&[address(ADDR_1)])
        .await
        .unwrap();

    assert!(outputs.is_empty());
}

#[tokio::test]
async fn test_fetch_surfaces_server_errors() {
    let stub = StubTransport::new();
    stub.reply(&utxo_url(ADDR_1), 429, "rate limited");

    let err = blockcypher(&stub)
        .fetch_unspent_outputs(&[address(ADDR_1)])
        .await
        .unwrap_err();

    assert!(matches!(err, ExplorerError::Server { status: 429, .. }));
}

#[tokio::test]
async fn test_txref_with_a_non_numeric_value_is_malformed() {
    let stub = StubTransport::new();
    let mut bad = txref(TXID_A, 0, 0);
    bad["value"] = json!("lots");
    stub.reply(
        &utxo_url(ADDR_1),
        200,
        &json!({ "address": ADDR_1, "txrefs": [bad] }).to_string(),
    );

    let err = blockcypher(&stub)
        .fetch_unspent_outputs(&[address(ADDR_1)])
        .await
        .unwrap_err();

    assert!(matches!(err, ExplorerError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_broadcast_posts_to_tx_push() {
    let stub = StubTransport::new();
    stub.reply(
        "https://api.blockcypher.com/v1/btc/test3/tx/push",
        201,
        &json!({ "hash": TXID_A }).to_string(),
    );

    let txid = blockcypher(&stub).broadcast(RAW_TX).await.unwrap();

    assert_eq!(txid.to_string(), TXID_A);
    assert_eq!(
        stub.recorded(),
        vec![Recorded::Post(
            "https://api.blockcypher.com/v1/btc/test3/tx/push".into(),
            json!({ "tx": RAW_TX }),
        )]
    );
}

#[tokio::test]
async fn test_broadcast_only_accepts_the_created_status() {
    // The push endpoint answers 201 on success; a 200 is not one.
    let stub = StubTransport::new();
    stub.reply(
        "https://api.blockcypher.com/v1/btc/test3/tx/push",
        200,
        &json!({ "hash": TXID_A }).to_string(),
    );

    let err = blockcypher(&stub).broadcast(RAW_TX).await.unwrap_err();

    assert!(matches!(err, ExplorerError::Server { status: 200, .. }));
}
