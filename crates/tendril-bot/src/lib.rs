//! Process entry points for the two roles a deployment runs: the singleton
//! `orchestrator` and the per-pair `worker`, selected by `main.rs` on
//! whether `TENDRIL_WORKER_PAIR` is set (§4.3's "same executable ... pair id
//! as argument/env" spawn contract).

pub mod config;
pub mod orchestrator;
pub mod worker;

pub use config::BotConfig;
