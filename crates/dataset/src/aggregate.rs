use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{Column, SurveyRecord};

/// One bar of the Value distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Mean Value of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`. The last bin is closed on the right so the
/// maximum is counted.
pub(crate) fn value_histogram(records: &[SurveyRecord], max_bins: usize) -> Vec<HistogramBin> {
    let Some((min, max)) = records.iter().fold(None, |acc, r| match acc {
        None => Some((r.value, r.value)),
        Some((lo, hi)) => Some((f64::min(lo, r.value), f64::max(hi, r.value))),
    }) else {
        return Vec::new();
    };

    if min == max {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: records.len(),
        }];
    }

    let bins = max_bins.max(1);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for record in records {
        let idx = ((record.value - min) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

/// Mean Value per non-null group, highest mean first (ties broken by group name).
pub(crate) fn mean_by(records: &[SurveyRecord], column: Column) -> Vec<GroupMean> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(group) = record.get(column) {
            let entry = sums.entry(group).or_insert((0.0, 0));
            entry.0 += record.value;
            entry.1 += 1;
        }
    }

    let mut means: Vec<GroupMean> = sums
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group: group.to_string(),
            mean: sum / count as f64,
            count,
        })
        .collect();
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.group.cmp(&b.group)));
    means
}
