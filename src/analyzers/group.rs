//! Group-by over a fixed set of keys.
//!
//! Groups iterate in the key's natural order: codes lexicographically,
//! weekdays Monday first, months ascending. Every tie-break downstream
//! relies on that order.

use crate::analyzers::utility::mean;
use crate::flight::{FlightRecord, day_name};
use chrono::Weekday;
use std::collections::BTreeMap;
use std::fmt;

/// Columns a table can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Origin,
    Destination,
    Carrier,
    DayOfWeek,
    Month,
}

/// The value of a [`GroupKey`] for one row. Codes compare case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue<'a> {
    Code(&'a str),
    /// Days from Monday, 0..=6.
    Day(u32),
    Month(u32),
}

static WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl GroupKey {
    pub fn value_of(self, rec: &FlightRecord) -> GroupValue<'_> {
        match self {
            GroupKey::Origin => GroupValue::Code(&rec.origin),
            GroupKey::Destination => GroupValue::Code(&rec.dest),
            GroupKey::Carrier => GroupValue::Code(&rec.carrier),
            GroupKey::DayOfWeek => GroupValue::Day(rec.day_of_week.num_days_from_monday()),
            GroupKey::Month => GroupValue::Month(rec.month),
        }
    }
}

impl<'a> GroupValue<'a> {
    pub fn as_code(self) -> Option<&'a str> {
        match self {
            GroupValue::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn as_day(self) -> Option<Weekday> {
        match self {
            GroupValue::Day(n) => WEEK.get(n as usize).copied(),
            _ => None,
        }
    }

    pub fn as_month(self) -> Option<u32> {
        match self {
            GroupValue::Month(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for GroupValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GroupValue::Code(code) => f.write_str(code),
            GroupValue::Day(_) => f.write_str(self.as_day().map(day_name).unwrap_or("?")),
            GroupValue::Month(m) => write!(f, "{m}"),
        }
    }
}

/// Partitions rows by `key`, keeping row order inside each group.
pub fn group_rows(
    rows: &[FlightRecord],
    key: GroupKey,
) -> BTreeMap<GroupValue<'_>, Vec<&FlightRecord>> {
    let mut groups: BTreeMap<GroupValue<'_>, Vec<&FlightRecord>> = BTreeMap::new();
    for row in rows {
        groups.entry(key.value_of(row)).or_default().push(row);
    }
    groups
}

/// Number of rows per group.
pub fn count_by(rows: &[FlightRecord], key: GroupKey) -> BTreeMap<GroupValue<'_>, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(key.value_of(row)).or_insert(0) += 1;
    }
    counts
}

/// Mean of `metric` per group. Rows where `metric` is `None` are skipped, and
/// a group with no values at all is left out.
pub fn mean_by<F>(
    rows: &[FlightRecord],
    key: GroupKey,
    metric: F,
) -> BTreeMap<GroupValue<'_>, f64>
where
    F: Fn(&FlightRecord) -> Option<f64>,
{
    let mut series: BTreeMap<GroupValue<'_>, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(value) = metric(row) {
            series.entry(key.value_of(row)).or_default().push(value);
        }
    }

    series
        .into_iter()
        .filter_map(|(group, values)| mean(&values).map(|m| (group, m)))
        .collect()
}

/// The entry with the largest value; on ties the first one in key order wins.
pub fn max_entry<K: Copy, V: PartialOrd + Copy>(map: &BTreeMap<K, V>) -> Option<(K, V)> {
    let mut best: Option<(K, V)> = None;
    for (&k, &v) in map {
        match best {
            Some((_, top)) if v <= top => {}
            _ => best = Some((k, v)),
        }
    }
    best
}
