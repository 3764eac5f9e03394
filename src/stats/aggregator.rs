// src/stats/aggregator.rs
use crate::probe::ProbeResult;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-URL figures derived from the history at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStats {
    #[serde(rename = "uptime")]
    pub uptime_percent: f64,
    pub total_checks: usize,
    #[serde(rename = "avgResponseTime")]
    pub avg_response_time_ms: u64,
    pub last_check: Option<ProbeResult>,
}

impl UrlStats {
    fn empty() -> Self {
        Self {
            uptime_percent: 0.0,
            total_checks: 0,
            avg_response_time_ms: 0,
            last_check: None,
        }
    }
}

/// Stats keyed by URL, in registry order. Serializes as a JSON object whose
/// keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsReport {
    entries: Vec<(String, UrlStats)>,
}

impl StatsReport {
    pub fn get(&self, url: &str) -> Option<&UrlStats> {
        self.entries
            .iter()
            .find(|(key, _)| key == url)
            .map(|(_, stats)| stats)
    }

    pub fn contains_key(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UrlStats)> {
        self.entries.iter().map(|(url, stats)| (url.as_str(), stats))
    }
}

impl Serialize for StatsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (url, stats) in &self.entries {
            map.serialize_entry(url, stats)?;
        }
        map.end()
    }
}

#[derive(Default)]
struct Tally<'a> {
    total: usize,
    up: usize,
    latency_sum: u128,
    last: Option<&'a ProbeResult>,
}

/// Statistics for every URL in `urls`, including ones with no history,
/// in the order of `urls`.
///
/// History entries for URLs outside `urls` are ignored. A URL listed twice
/// is reported once.
pub fn stats_for<S: AsRef<str>>(urls: &[S], history: &[ProbeResult]) -> StatsReport {
    let mut tallies: HashMap<&str, Tally<'_>> = urls
        .iter()
        .map(|url| (url.as_ref(), Tally::default()))
        .collect();

    for entry in history {
        if let Some(tally) = tallies.get_mut(entry.url.as_str()) {
            tally.total += 1;
            if entry.is_up() {
                tally.up += 1;
            }
            tally.latency_sum += u128::from(entry.response_time_ms);
            tally.last = Some(entry);
        }
    }

    let entries = urls
        .iter()
        .filter_map(|url| {
            let url = url.as_ref();
            tallies
                .remove(url)
                .map(|tally| (url.to_string(), tally.into_stats()))
        })
        .collect();

    StatsReport { entries }
}

impl Tally<'_> {
    fn into_stats(self) -> UrlStats {
        if self.total == 0 {
            return UrlStats::empty();
        }

        let uptime = self.up as f64 / self.total as f64 * 100.0;
        let average = self.latency_sum as f64 / self.total as f64;

        UrlStats {
            uptime_percent: round_to_hundredths(uptime),
            total_checks: self.total,
            avg_response_time_ms: average.round() as u64,
            last_check: self.last.cloned(),
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
