use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use bitcoin::{Address, OutPoint, Txid};
use futures::future::join_all;
use log::{debug, warn};

use crate::error::{BackendFailure, ExplorerError, Operation, Result};
use crate::explorer::{check_addresses, check_raw_tx, Explorer};
use crate::models::UnspentOutput;

/// Fans each call out to every configured explorer at once and answers only
/// when they all agree. Explorers can lag, censor, or be outright
/// compromised; demanding unanimity means no single faulty service can
/// inject a forged output or suppress a real one. Majority voting is
/// deliberately avoided: with two explorers a tie is unresolvable anyway.
///
/// A `Pool` implements [`Explorer`] itself, so it can be used anywhere a
/// single backend is expected, including inside another pool.
pub struct Pool {
    explorers: Vec<Box<dyn Explorer>>,
}

impl Pool {
    pub fn new(explorers: Vec<Box<dyn Explorer>>) -> Result<Self> {
        if explorers.is_empty() {
            return Err(ExplorerError::Argument(
                "a pool needs at least one explorer".into(),
            ));
        }

        Ok(Pool { explorers })
    }

    // All-or-nothing: either every backend produced a value, or the call
    // fails naming every backend that did not.
    fn collect<T>(&self, results: Vec<Result<T>>) -> Result<Vec<T>> {
        let mut collected = Vec::with_capacity(results.len());
        let mut failures = Vec::new();

        for (explorer, result) in self.explorers.iter().zip(results) {
            match result {
                Ok(value) => collected.push(value),
                Err(error) => failures.push(BackendFailure {
                    explorer: explorer.name().to_string(),
                    error,
                }),
            }
        }

        if !failures.is_empty() {
            debug!(
                "pool call failed explorers={}/{}",
                failures.len(),
                self.explorers.len()
            );
            return Err(ExplorerError::BackendFailures(failures));
        }

        Ok(collected)
    }
}

// Trait objects have no derivable Debug; render the explorer names instead.
impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .explorers
            .iter()
            .map(|explorer| explorer.name())
            .collect::<Vec<_>>();

        f.debug_struct("Pool").field("explorers", &names).finish()
    }
}

#[async_trait]
impl Explorer for Pool {
    fn name(&self) -> &str {
        "pool"
    }

    async fn fetch_unspent_outputs(&self, addresses: &[Address]) -> Result<Vec<UnspentOutput>> {
        check_addresses(addresses)?;
        debug!(
            "pool utxo lookup explorers={} addresses={}",
            self.explorers.len(),
            addresses.len()
        );

        let results = join_all(
            self.explorers
                .iter()
                .map(|explorer| explorer.fetch_unspent_outputs(addresses)),
        )
        .await;
        let mut lists = self.collect(results)?;

        // Cheap count comparison first; identities only matter when the
        // counts already line up.
        let expected = lists[0].len();
        for (position, list) in lists.iter().enumerate().skip(1) {
            if list.len() != expected {
                warn!(
                    "utxo count mismatch explorer={} count={} expected={}",
                    self.explorers[position].name(),
                    list.len(),
                    expected
                );
                return Err(ExplorerError::Disagreement {
                    operation: Operation::UnspentOutputs,
                });
            }
        }

        // Outputs match by (txid, vout) only, counted with multiplicity.
        // Scripts and amounts are taken from the first explorer untouched.
        let canonical = identity_counts(&lists[0]);
        for (position, list) in lists.iter().enumerate().skip(1) {
            if identity_counts(list) != canonical {
                warn!(
                    "utxo identity mismatch explorer={}",
                    self.explorers[position].name()
                );
                return Err(ExplorerError::Disagreement {
                    operation: Operation::UnspentOutputs,
                });
            }
        }

        Ok(lists.swap_remove(0))
    }

    async fn broadcast(&self, raw_tx: &str) -> Result<Txid> {
        check_raw_tx(raw_tx)?;
        debug!("pool broadcast explorers={}", self.explorers.len());

        let results = join_all(
            self.explorers
                .iter()
                .map(|explorer| explorer.broadcast(raw_tx)),
        )
        .await;
        let txids = self.collect(results)?;

        let txid = txids[0];
        for (position, other) in txids.iter().enumerate().skip(1) {
            if *other != txid {
                warn!(
                    "broadcast txid mismatch explorer={} txid={} expected={}",
                    self.explorers[position].name(),
                    other,
                    txid
                );
                return Err(ExplorerError::Disagreement {
                    operation: Operation::Broadcast,
                });
            }
        }

        Ok(txid)
    }
}

fn identity_counts(outputs: &[UnspentOutput]) -> HashMap<OutPoint, usize> {
    let mut counts = HashMap::with_capacity(outputs.len());
    for output in outputs {
        *counts.entry(output.outpoint()).or_insert(0usize) += 1;
    }

    counts
}
