pub mod aave_client;
pub mod alchemy_client;
pub mod contracts;
pub mod history_client;
pub mod ledger;
pub mod token_client;
pub mod tx_submitter;

#[cfg(test)]
pub(crate) mod fake_ledger;
