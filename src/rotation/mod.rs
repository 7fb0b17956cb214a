pub mod history;
pub mod ledger;
