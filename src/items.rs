//! Tracked list items annotated with the day and week they changed.

use crate::calendar::{self, DayInfo, DayNumber, WeekNumber, WeekOfYear};
use crate::error::Result;
use crate::format::sha256_hex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Markdown of the list entry as it appears in the source file.
    pub markdown: String,
    pub category: String,
    pub source_identifier: String,
    pub file: String,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Stable identity of an entry within its source file.
    pub fn id(&self) -> String {
        sha256_hex(&format!("{}:{}:{}", self.source_identifier, self.file, self.markdown))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub updated_day: DayNumber,
    pub updated_week: WeekNumber,
    pub updated_day_info: DayInfo,
    pub updated_week_info: WeekOfYear,
}

impl ItemDetail {
    pub fn from_item(item: Item) -> Result<Self> {
        let updated_day = calendar::day_number(&item.updated_at);
        let updated_week = calendar::week_number(&item.updated_at);
        Ok(Self {
            updated_day_info: calendar::parse_day_number(updated_day)?,
            updated_week_info: calendar::parse_week_number(updated_week)?,
            updated_day,
            updated_week,
            item,
        })
    }
}

pub fn items_details<I>(items: I) -> Result<Vec<ItemDetail>>
where
    I: IntoIterator<Item = Item>,
{
    items.into_iter().map(ItemDetail::from_item).collect()
}

/// Newest day first; items keep their input order within a day.
pub fn group_by_day(details: Vec<ItemDetail>) -> Vec<(DayInfo, Vec<ItemDetail>)> {
    let mut groups: BTreeMap<DayNumber, Vec<ItemDetail>> = BTreeMap::new();
    for detail in details {
        groups.entry(detail.updated_day).or_default().push(detail);
    }
    groups
        .into_values()
        .rev()
        .filter_map(|group| Some((group.first()?.updated_day_info.clone(), group)))
        .collect()
}

/// Newest week first; items keep their input order within a week.
pub fn group_by_week(details: Vec<ItemDetail>) -> Vec<(WeekOfYear, Vec<ItemDetail>)> {
    let mut groups: BTreeMap<WeekNumber, Vec<ItemDetail>> = BTreeMap::new();
    for detail in details {
        groups.entry(detail.updated_week).or_default().push(detail);
    }
    groups
        .into_values()
        .rev()
        .filter_map(|group| Some((group.first()?.updated_week_info.clone(), group)))
        .collect()
}
