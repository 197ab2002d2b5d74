use super::{ChainSource, Utxo};
use crate::errors::{LedgerError, LedgerResult};
use crate::types::{InputContext, OutputContext, StateHash, TxContext};
use bitcoin::absolute::LockTime;
use bitcoin::consensus::serialize;
use bitcoin::hashes::Hash;
use bitcoin::script::Builder;
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Network, OutPoint, Script, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid,
    Witness,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// In-memory chain: every applied transaction plus the live UTXO set
pub struct MemoryLedger {
    network: Network,
    transactions: HashMap<Txid, Transaction>,
    utxos: HashMap<OutPoint, Utxo>,
    funding_count: i64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryLedger {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            transactions: HashMap::new(),
            utxos: HashMap::new(),
            funding_count: 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create a spendable output out of thin air
    ///
    /// The funding transaction spends a null outpoint, like a coinbase; its
    /// script_sig carries a counter so repeated fundings get distinct txids.
    pub fn fund(&mut self, script_pubkey: ScriptBuf, satoshis: u64) -> OutPoint {
        self.funding_count += 1;
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: Builder::new().push_int(self.funding_count).into_script(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(satoshis),
                script_pubkey,
            }],
        };
        let txid = tx.compute_txid();
        self.insert_outputs(&tx, &[StateHash::NONE]);
        self.transactions.insert(txid, tx);
        debug!("Funded {} with {} sats", txid, satoshis);
        OutPoint::new(txid, 0)
    }

    /// Apply a transaction: spend its inputs and create its outputs
    ///
    /// `state_hashes` holds one commitment per output, `StateHash::NONE` for
    /// outputs without state.
    pub fn apply(&mut self, tx: Transaction, state_hashes: &[StateHash]) -> LedgerResult<Txid> {
        if state_hashes.len() != tx.output.len() {
            return Err(LedgerError::StateCountMismatch {
                expected: tx.output.len(),
                actual: state_hashes.len(),
            });
        }
        self.check_inputs(&tx)?;

        for input in &tx.input {
            self.utxos.remove(&input.previous_output);
        }
        self.insert_outputs(&tx, state_hashes);

        let txid = tx.compute_txid();
        debug!(
            "Applied {}: {} inputs spent, {} outputs created",
            txid,
            tx.input.len(),
            tx.output.len()
        );
        self.transactions.insert(txid, tx);
        Ok(txid)
    }

    /// Build the covenant view of `tx` against the current UTXO set
    ///
    /// Without an explicit `sighash` the txid bytes stand in for the digest
    /// signatures commit to.
    pub fn context_for(
        &self,
        tx: &Transaction,
        state_hashes: &[StateHash],
        sighash: Option<[u8; 32]>,
    ) -> LedgerResult<TxContext> {
        if state_hashes.len() != tx.output.len() {
            return Err(LedgerError::StateCountMismatch {
                expected: tx.output.len(),
                actual: state_hashes.len(),
            });
        }
        self.check_inputs(tx)?;

        let inputs = tx
            .input
            .iter()
            .map(|txin| {
                let utxo = self.utxo(&txin.previous_output)?;
                Ok(InputContext {
                    outpoint: utxo.outpoint,
                    script_pubkey: utxo.output.script_pubkey.clone(),
                    satoshis: utxo.output.value.to_sat(),
                    state_hash: utxo.state_hash,
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        let outputs = tx
            .output
            .iter()
            .zip(state_hashes)
            .map(|(txout, state_hash)| OutputContext {
                script_pubkey: txout.script_pubkey.clone(),
                satoshis: txout.value.to_sat(),
                state_hash: *state_hash,
            })
            .collect();

        Ok(TxContext {
            inputs,
            outputs,
            sighash: sighash.unwrap_or_else(|| tx.compute_txid().to_byte_array()),
        })
    }

    pub fn utxo(&self, outpoint: &OutPoint) -> LedgerResult<&Utxo> {
        self.utxos
            .get(outpoint)
            .ok_or_else(|| LedgerError::MissingOutput {
                outpoint: outpoint.to_string(),
            })
    }

    pub fn transaction(&self, txid: &Txid) -> Option<&Transaction> {
        self.transactions.get(txid)
    }

    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    pub fn get_stats(&self) -> LedgerStats {
        LedgerStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn check_inputs(&self, tx: &Transaction) -> LedgerResult<()> {
        let mut seen = HashSet::new();
        for input in &tx.input {
            let outpoint = input.previous_output;
            if !seen.insert(outpoint) {
                return Err(LedgerError::DuplicateInput {
                    outpoint: outpoint.to_string(),
                });
            }
            if !self.utxos.contains_key(&outpoint) {
                return Err(LedgerError::MissingOutput {
                    outpoint: outpoint.to_string(),
                });
            }
        }
        Ok(())
    }

    fn insert_outputs(&mut self, tx: &Transaction, state_hashes: &[StateHash]) {
        let txid = tx.compute_txid();
        for (vout, (output, state_hash)) in tx.output.iter().zip(state_hashes).enumerate() {
            let outpoint = OutPoint::new(txid, vout as u32);
            self.utxos.insert(
                outpoint,
                Utxo {
                    outpoint,
                    output: output.clone(),
                    state_hash: *state_hash,
                },
            );
        }
    }
}

impl ChainSource for MemoryLedger {
    fn get_raw_transaction(&self, txid: &Txid) -> LedgerResult<Vec<u8>> {
        match self.transactions.get(txid) {
            Some(tx) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Ledger hit for transaction: {}", txid);
                Ok(serialize(tx))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Ledger miss for transaction: {}", txid);
                Err(LedgerError::TransactionNotFound {
                    txid: txid.to_string(),
                })
            }
        }
    }

    fn get_utxos(&self, script_pubkey: &Script) -> Vec<Utxo> {
        let mut utxos: Vec<Utxo> = self
            .utxos
            .values()
            .filter(|utxo| utxo.output.script_pubkey.as_script() == script_pubkey)
            .cloned()
            .collect();
        utxos.sort_by_key(|utxo| (utxo.outpoint.txid, utxo.outpoint.vout));
        utxos
    }

    fn network(&self) -> Network {
        self.network
    }
}

/// Lookup statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerStats {
    pub hits: u64,
    pub misses: u64,
}

impl LedgerStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
