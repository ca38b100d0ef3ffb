pub mod account_analysis;
pub mod collateral;
pub mod supply_workflow;
pub mod token_balances;
