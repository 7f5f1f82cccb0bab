use std::time::Duration;

/// Stats of the episode loop in each [`Worker`](crate::Worker).
#[derive(Clone, Debug)]
pub struct WorkerStat {
    /// The number of episodes whose results were pushed.
    pub episodes: usize,

    /// Duration of the episode loop.
    pub duration: Duration,
}

/// Returns a formatted string of the set of [`WorkerStat`] for reporting.
pub fn worker_stats_fmt(stats: &[WorkerStat]) -> String {
    let mut s = "worker id, episodes, duration [sec], episodes per sec\n".to_string();
    for (i, stat) in stats.iter().enumerate() {
        let n = stat.episodes;
        let d = stat.duration.as_secs_f32();
        let p = if d > 0.0 { (n as f32) / d } else { 0.0 };
        s += format!("{}, {}, {}, {}\n", i, n, d, p).as_str();
    }
    s
}
