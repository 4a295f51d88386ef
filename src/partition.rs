//! Season and entity grouping.
//!
//! Anything that ranks rows against each other goes through a
//! [`SeasonPartition`], so a season's distribution never leaks into another
//! season. Trailing-window features go through [`EntityHistory`], which
//! orders one entity's rows by season regardless of input order.

use std::collections::BTreeMap;

use crate::stats;

pub trait SeasonRow {
    fn entity_id(&self) -> &str;
    fn season(&self) -> i32;
}

/// The rows of a single season, in input order, each tagged with its index
/// in the full table.
#[derive(Debug)]
pub struct SeasonPartition<'a, T> {
    season: i32,
    rows: Vec<(usize, &'a T)>,
}

impl<'a, T> SeasonPartition<'a, T> {
    pub fn season(&self) -> i32 {
        self.season
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a T)> + '_ {
        self.rows.iter().copied()
    }

    /// Percentile rank (0, 1] of `metric` within this season, returned as
    /// `(table_index, rank)` pairs.
    pub fn percentile_rank<F>(&self, metric: F) -> Vec<(usize, f64)>
    where
        F: Fn(&T) -> f64,
    {
        let values: Vec<f64> = self.rows.iter().map(|(_, row)| metric(row)).collect();
        let ranks = stats::percentile_rank(&values);
        self.rows
            .iter()
            .zip(ranks)
            .map(|((idx, _), rank)| (*idx, rank))
            .collect()
    }

    /// 1-based descending rank of `metric` within this season. Ties go to the
    /// row seen first. `metric` also receives the table index, for values
    /// kept alongside the table rather than on the row.
    pub fn rank_descending<F>(&self, metric: F) -> Vec<(usize, u32)>
    where
        F: Fn(usize, &T) -> f64,
    {
        let values: Vec<f64> = self.rows.iter().map(|(idx, row)| metric(*idx, row)).collect();
        let ranks = stats::rank_descending_first(&values);
        self.rows
            .iter()
            .zip(ranks)
            .map(|((idx, _), rank)| (*idx, rank))
            .collect()
    }
}

pub fn partition_by_season<T: SeasonRow>(rows: &[T]) -> Vec<SeasonPartition<'_, T>> {
    let mut by_season: BTreeMap<i32, Vec<(usize, &T)>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        by_season.entry(row.season()).or_default().push((idx, row));
    }
    by_season
        .into_iter()
        .map(|(season, rows)| SeasonPartition { season, rows })
        .collect()
}

/// Table indices of one entity's rows, ordered by ascending season.
#[derive(Debug, Clone)]
pub struct EntityHistory {
    pub entity_id: String,
    pub indices: Vec<usize>,
}

impl EntityHistory {
    pub fn series<T, F>(&self, rows: &[T], metric: F) -> Vec<f64>
    where
        F: Fn(&T) -> f64,
    {
        self.indices.iter().map(|&i| metric(&rows[i])).collect()
    }
}

/// Group `rows` by entity. Entities come out in order of first appearance.
pub fn entity_histories<T: SeasonRow>(rows: &[T]) -> Vec<EntityHistory> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let entry = groups.entry(row.entity_id()).or_default();
        if entry.is_empty() {
            order.push(row.entity_id().to_string());
        }
        entry.push(idx);
    }

    order
        .into_iter()
        .map(|entity_id| {
            let mut indices = groups.remove(entity_id.as_str()).unwrap_or_default();
            indices.sort_by_key(|&i| (rows[i].season(), i));
            EntityHistory { entity_id, indices }
        })
        .collect()
}
