//! Scroll synchronization between the content viewport and the TOC.
//!
//! A [`ScrollSync`] owns at most one [`Watch`] over the anchors of the
//! current render. Hosts report where each anchor sits relative to the top
//! of the viewport; only anchors inside the activation zone (the top part
//! of the viewport, 40% by default) count as intersecting, and the
//! intersecting anchor closest to the top becomes the active heading.

use crate::error::ObserverError;
use log::debug;
use std::collections::BTreeMap;

/// The heading currently judged in focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveHeading {
    /// Position of the heading in the render's heading list.
    pub index: usize,
    pub id: String,
}

impl ActiveHeading {
    pub fn new(index: usize, id: &str) -> Self {
        Self {
            index,
            id: id.to_string(),
        }
    }
}

/// Observation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    /// Share of the viewport, from the top, that counts as the active zone.
    pub activation_ratio: f32,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            activation_ratio: 0.4,
        }
    }
}

impl ObserveOptions {
    pub fn validate(&self) -> Result<(), ObserverError> {
        let ratio = self.activation_ratio;
        if ratio.is_finite() && ratio > 0.0 && ratio <= 1.0 {
            Ok(())
        } else {
            Err(ObserverError::InvalidRatio(ratio))
        }
    }

    /// Rows at the top of a viewport of `height` rows that form the zone.
    pub fn zone(&self, height: u16) -> f32 {
        f32::from(height) * self.activation_ratio
    }
}

/// Where an anchor sits, in rows, relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPosition {
    pub index: usize,
    pub top: i64,
    pub height: u16,
}

/// One change notification for an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub index: usize,
    pub top: i64,
    pub is_intersecting: bool,
}

/// Whether an anchor box overlaps the activation zone.
pub fn intersects(position: &AnchorPosition, zone: f32) -> bool {
    let top = position.top as f32;
    let bottom = top + f32::from(position.height.max(1));
    top < zone && bottom > 0.0
}

/// A live subscription on one render's anchors.
#[derive(Debug)]
struct Watch {
    anchors: Vec<String>,
    options: ObserveOptions,
    /// Intersecting anchors and their last known top.
    intersecting: BTreeMap<usize, i64>,
    active: Option<ActiveHeading>,
}

impl Watch {
    /// Entries whose intersection state changed since the last observation.
    fn changes(&self, positions: &[AnchorPosition], height: u16) -> Vec<IntersectionEntry> {
        let zone = self.options.zone(height);
        positions
            .iter()
            .filter(|p| p.index < self.anchors.len())
            .filter_map(|p| {
                let is_intersecting = intersects(p, zone);
                let was = self.intersecting.contains_key(&p.index);
                (is_intersecting != was).then_some(IntersectionEntry {
                    index: p.index,
                    top: p.top,
                    is_intersecting,
                })
            })
            .collect()
    }

    fn deliver(&mut self, entries: &[IntersectionEntry], positions: &[AnchorPosition]) {
        for entry in entries {
            if entry.is_intersecting {
                self.intersecting.insert(entry.index, entry.top);
            } else {
                self.intersecting.remove(&entry.index);
            }
        }
        for p in positions {
            if let Some(top) = self.intersecting.get_mut(&p.index) {
                *top = p.top;
            }
        }
    }

    fn nearest_to_top(&self) -> Option<ActiveHeading> {
        self.intersecting
            .iter()
            .min_by_key(|(index, top)| (**top, **index))
            .map(|(&index, _)| ActiveHeading::new(index, &self.anchors[index]))
    }
}

impl Drop for Watch {
    fn drop(&mut self) {
        debug!("released watch on {} anchors", self.anchors.len());
    }
}

/// Tracks the active heading for the current render.
#[derive(Debug, Default)]
pub struct ScrollSync {
    watch: Option<Watch>,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `anchors` (heading ids in document order).
    ///
    /// Any previous watch is released first. No watch is installed for an
    /// empty anchor list. Fails when the options are invalid or the viewport
    /// has no rows; the sync then stays disabled until the next install.
    pub fn install(
        &mut self,
        anchors: &[String],
        options: ObserveOptions,
        viewport_height: u16,
    ) -> Result<(), ObserverError> {
        self.teardown();
        if anchors.is_empty() {
            return Ok(());
        }
        options.validate()?;
        if viewport_height == 0 {
            return Err(ObserverError::EmptyViewport);
        }
        debug!("watching {} anchors", anchors.len());
        self.watch = Some(Watch {
            anchors: anchors.to_vec(),
            options,
            intersecting: BTreeMap::new(),
            active: None,
        });
        Ok(())
    }

    /// Release the current watch, if any.
    pub fn teardown(&mut self) {
        self.watch = None;
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    pub fn active(&self) -> Option<&ActiveHeading> {
        self.watch.as_ref().and_then(|w| w.active.as_ref())
    }

    /// Feed the current anchor positions.
    ///
    /// Returns the new active heading when it changed. While no anchor
    /// intersects, the previous active heading is kept.
    pub fn observe(
        &mut self,
        positions: &[AnchorPosition],
        viewport_height: u16,
    ) -> Option<ActiveHeading> {
        let watch = self.watch.as_mut()?;
        let entries = watch.changes(positions, viewport_height);
        watch.deliver(&entries, positions);

        let nearest = watch.nearest_to_top()?;
        if watch.active.as_ref() == Some(&nearest) {
            return None;
        }
        watch.active = Some(nearest.clone());
        Some(nearest)
    }
}
