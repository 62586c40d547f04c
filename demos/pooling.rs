use log::info;

use bitcoin_explorers::bitcoin::address::NetworkUnchecked;
use bitcoin_explorers::bitcoin::{Address, Network};
use bitcoin_explorers::{BlockCypher, Explorer, Insight, Pool};

#[tokio::main]
async fn main() {
    env_logger::init();

    let address = "1Eg5c8YAdTo48qCMh6WBH1BgXw6isfYLh9"
        .parse::<Address<NetworkUnchecked>>()
        .unwrap()
        .require_network(Network::Bitcoin)
        .unwrap();
    info!("address: {}", address);

    let pool = Pool::new(vec![Box::new(BlockCypher::new()), Box::new(Insight::new())]).unwrap();

    match pool.fetch_unspent_outputs(&[address]).await {
        Ok(outputs) => {
            info!("explorers agree on {} unspent outputs", outputs.len());
            for output in outputs {
                println!(
                    "{}:{} {} sat",
                    output.txid, output.output_index, output.satoshis
                );
            }
        }
        Err(e) => eprintln!("lookup failed: {}", e),
    }
}
