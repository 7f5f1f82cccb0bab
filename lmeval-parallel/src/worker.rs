//! Workers playing episodes on their own threads.
mod base;
mod pool;
mod stat;
pub use base::Worker;
pub use pool::{WorkerChannels, WorkerPool};
pub use stat::{worker_stats_fmt, WorkerStat};
