pub mod alerts;
pub mod clock;
pub mod config;
pub mod ledger;
pub mod measurement;
pub mod monitor;
pub mod notify;
pub mod source;
pub mod storage;
pub mod threshold;
pub mod util;
