//! Bottom-up progress rollup.
//!
//! Every level's progress is the half-up rounded mean of its active
//! children's (already rounded) progress, so rounding drift accumulates
//! level by level. Nodes without active children keep their stored value.

use uuid::Uuid;

use crate::db::{Record, Store};
use crate::error::Result;
use crate::models::*;

/// Round to the nearest integer, halves rounding up.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    sum: i64,
    count: i64,
}

impl Tally {
    fn add(&mut self, progress: i32) {
        self.sum += i64::from(progress);
        self.count += 1;
    }

    fn mean(&self) -> Option<i32> {
        (self.count > 0).then(|| round_half_up(self.sum as f64 / self.count as f64))
    }
}

enum Metric {
    /// No positive target or no current reading.
    Missing,
    /// Target equals start.
    ZeroRange,
    Progress(i32),
}

fn metric(kr: &KeyResult) -> Metric {
    let (Some(target), Some(current)) = (kr.metric_target, kr.metric_current) else {
        return Metric::Missing;
    };
    if target <= 0.0 {
        return Metric::Missing;
    }
    let start = kr.metric_start.unwrap_or(0.0);
    let range = target - start;
    if range == 0.0 {
        return Metric::ZeroRange;
    }
    Metric::Progress(round_half_up((current - start) / range * 100.0).clamp(0, 100))
}

/// Recompute a key result from its action items or metric.
///
/// Returns `true` if `progress` or `metric_current` changed.
pub fn derive_key_result(kr: &mut KeyResult, items: &[ActionItem]) -> bool {
    let before = (kr.progress, kr.metric_current);

    let mut active_items = Tally::default();
    for item in items.iter().filter(|i| i.is_active()) {
        active_items.add(item.progress);
    }

    if kr.manual_progress_set {
        if let Metric::Progress(progress) = metric(kr) {
            kr.progress = progress;
        }
    } else if let Some(mean) = active_items.mean() {
        let progress = mean.min(100);
        kr.progress = progress;
        // Keep the metric in step with the item-derived progress.
        if let Some(target) = kr.metric_target.filter(|t| *t > 0.0) {
            let start = kr.metric_start.unwrap_or(0.0);
            kr.metric_current = Some(start + (target - start) * f64::from(progress) / 100.0);
        }
    } else {
        match metric(kr) {
            Metric::Progress(progress) => kr.progress = progress,
            Metric::ZeroRange => kr.progress = 0,
            Metric::Missing => {}
        }
    }

    (kr.progress, kr.metric_current) != before
}

/// Recompute progress for every active node under `project_id`, then the
/// project itself, persisting each node whose values changed.
pub fn recalculate_project(store: &Store<'_>, project_id: Uuid) -> Result<Project> {
    tracing::info!("Recalculating project {}", project_id);

    let mut project: Project = store.get(project_id)?;
    let mut rollup = Rollup { store, saved: 0 };
    rollup.level(&mut project, Rollup::initiative)?;

    tracing::info!(
        "Recalculated project {}: progress={} nodes_saved={}",
        project_id,
        project.progress,
        rollup.saved
    );
    Ok(project)
}

struct Rollup<'s, 'conn> {
    store: &'s Store<'conn>,
    saved: usize,
}

impl Rollup<'_, '_> {
    fn initiative(&mut self, initiative: &mut Initiative) -> Result<()> {
        self.level(initiative, Self::goal)
    }

    fn goal(&mut self, goal: &mut Goal) -> Result<()> {
        self.level(goal, Self::objective)
    }

    fn objective(&mut self, objective: &mut Objective) -> Result<()> {
        self.level(objective, Self::key_result)
    }

    fn key_result(&mut self, kr: &mut KeyResult) -> Result<()> {
        let items: Vec<ActionItem> = self.store.children(kr.id)?;
        if kr.manual_progress_set {
            tracing::debug!("Key result {} is locked at {}", kr.id, kr.progress);
        }
        if derive_key_result(kr, &items) {
            self.store.save(kr)?;
            self.saved += 1;
        }
        Ok(())
    }

    /// Roll up every active child of `node`, then set `node` to their mean.
    fn level<N, C>(
        &mut self,
        node: &mut N,
        roll_child: fn(&mut Self, &mut C) -> Result<()>,
    ) -> Result<()>
    where
        N: Record,
        C: Record,
    {
        let mut tally = Tally::default();
        for mut child in self.store.children::<C>(node.id())? {
            if !child.is_active() {
                continue;
            }
            roll_child(self, &mut child)?;
            tally.add(child.progress());
        }

        if let Some(mean) = tally.mean() {
            if mean != node.progress() {
                node.set_progress(mean);
                self.store.save(node)?;
                self.saved += 1;
            }
        }
        Ok(())
    }
}
