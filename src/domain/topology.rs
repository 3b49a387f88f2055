//! Monitor topology and capture-target resolution
//!
//! A `ScreenTopology` is an immutable snapshot of the monitors known at the
//! start of a capture session. It maps a selection drawn in global
//! (virtual-desktop) coordinates onto exactly one monitor and a rectangle in
//! that monitor's local pixel space.
//!
//! Resolution is two-phase:
//! 1. the monitor with the largest overlap wins (ties go to the earliest
//!    monitor in input order);
//! 2. if nothing overlaps, the monitor whose centre-x is nearest to the
//!    selection's centre-x wins (same tie-break).
//!
//! Only the horizontal centre is compared in phase 2. Monitors stacked
//! vertically with a gap between them are not distinguished by distance.

use thiserror::Error;

use crate::domain::core::Rect;

/// A monitor as seen by the topology
///
/// `index` is the monitor's position in the list the topology was built from,
/// so the host can map it back to its own display handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Monitor {
    pub index: usize,
    /// Bounds in global coordinates
    pub geometry: Rect,
}

impl Monitor {
    pub fn new(index: usize, geometry: Rect) -> Self {
        Self { index, geometry }
    }
}

/// Errors produced while building or querying a topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("No displays available")]
    NoDisplays,

    #[error("Selection does not cover any pixels of monitor {}", .monitor.index)]
    EmptyAfterClamp { monitor: Monitor },
}

/// Why a monitor was chosen for a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceReason {
    /// The selection overlaps the monitor by `area` square pixels
    Overlap { area: i64 },
    /// Nothing overlapped; the monitor's centre-x is `distance` pixels away
    Nearest { distance: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorChoice {
    pub monitor: Monitor,
    pub reason: ChoiceReason,
}

/// Resolved capture target handed to the external capture function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureInstruction {
    pub monitor: Monitor,
    /// Selection in the monitor's local coordinates, clamped to its bounds
    pub local: Rect,
}

impl CaptureInstruction {
    /// The captured region back in global coordinates
    pub fn global_rect(&self) -> Rect {
        self.local
            .translate(self.monitor.geometry.x, self.monitor.geometry.y)
    }
}

/// Immutable snapshot of the monitor layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenTopology {
    monitors: Vec<Monitor>,
}

impl ScreenTopology {
    /// Builds a topology from an already indexed monitor list
    ///
    /// The input order is kept and is the tie-break order for `resolve`.
    pub fn build(monitors: Vec<Monitor>) -> Result<Self, TopologyError> {
        if monitors.is_empty() {
            return Err(TopologyError::NoDisplays);
        }

        Ok(Self { monitors })
    }

    /// Builds a topology from plain geometries, indexing them in order
    pub fn from_geometries<I>(geometries: I) -> Result<Self, TopologyError>
    where
        I: IntoIterator<Item = Rect>,
    {
        let monitors = geometries
            .into_iter()
            .enumerate()
            .map(|(index, geometry)| Monitor::new(index, geometry))
            .collect();

        Self::build(monitors)
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor_count(&self) -> usize {
        self.monitors.len()
    }

    /// Bounding rectangle covering every monitor
    ///
    /// Used to size the full-desktop selection surface. Gaps between
    /// monitors are part of the result.
    pub fn combined_geometry(&self) -> Rect {
        let mut monitors = self.monitors.iter();
        // build() guarantees at least one monitor
        let first = monitors.next().map(|m| m.geometry).unwrap_or_default();
        monitors.fold(first, |acc, monitor| acc.union(&monitor.geometry))
    }

    /// Monitors the rectangle overlaps, with their overlap area, in input order
    pub fn touching<'a>(&'a self, rect: &'a Rect) -> impl Iterator<Item = (&'a Monitor, i64)> + 'a {
        self.monitors
            .iter()
            .map(move |monitor| (monitor, monitor.geometry.intersection_area(rect)))
            .filter(|(_, area)| *area > 0)
    }

    /// Picks the single monitor a selection should be captured from
    ///
    /// Always succeeds: the topology is never empty and the nearest-monitor
    /// fallback covers selections that lie in a gap.
    pub fn choose_monitor(&self, selection: &Rect) -> MonitorChoice {
        let mut best: Option<(&Monitor, i64)> = None;
        for (monitor, area) in self.touching(selection) {
            // Strictly larger only: ties keep the earlier monitor
            if best.is_none_or(|(_, best_area)| area > best_area) {
                best = Some((monitor, area));
            }
        }

        if let Some((monitor, area)) = best {
            return MonitorChoice {
                monitor: *monitor,
                reason: ChoiceReason::Overlap { area },
            };
        }

        let selection_center = i64::from(selection.center_x());
        let mut nearest = (self.monitors[0], i64::MAX);
        for monitor in &self.monitors {
            let distance = (i64::from(monitor.geometry.center_x()) - selection_center).abs();
            if distance < nearest.1 {
                nearest = (*monitor, distance);
            }
        }

        MonitorChoice {
            monitor: nearest.0,
            reason: ChoiceReason::Nearest {
                distance: nearest.1,
            },
        }
    }

    /// Resolves a global selection into a monitor and a local rectangle
    ///
    /// The local rectangle is clamped to the monitor's extent and is never
    /// empty; a selection that contributes no pixels to the chosen monitor
    /// fails with `EmptyAfterClamp`.
    pub fn resolve(&self, selection: &Rect) -> Result<CaptureInstruction, TopologyError> {
        let choice = self.choose_monitor(selection);
        let monitor = choice.monitor;

        let local = selection
            .translate(-monitor.geometry.x, -monitor.geometry.y)
            .clamp_to_extent(monitor.geometry.w, monitor.geometry.h)
            .ok_or(TopologyError::EmptyAfterClamp { monitor })?;

        Ok(CaptureInstruction { monitor, local })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gapped() -> ScreenTopology {
        ScreenTopology::from_geometries([
            Rect::new(0, 0, 1920, 1080),
            Rect::new(3840, 0, 1920, 1080),
        ])
        .unwrap()
    }

    #[test]
    fn empty_monitor_list_is_rejected() {
        assert_eq!(ScreenTopology::build(Vec::new()), Err(TopologyError::NoDisplays));
        assert_eq!(
            ScreenTopology::from_geometries(std::iter::empty()),
            Err(TopologyError::NoDisplays)
        );
    }

    #[test]
    fn from_geometries_indexes_in_order() {
        let topology = gapped();
        assert_eq!(topology.monitor_count(), 2);
        assert_eq!(topology.monitors()[0].index, 0);
        assert_eq!(topology.monitors()[1].index, 1);
        assert_eq!(topology.monitors()[1].geometry.x, 3840);
    }

    #[test]
    fn selection_on_primary_screen() {
        let instruction = gapped().resolve(&Rect::new(500, 500, 200, 200)).unwrap();
        assert_eq!(instruction.monitor.index, 0);
        assert_eq!(instruction.local, Rect::new(500, 500, 200, 200));
    }

    #[test]
    fn selection_on_secondary_screen_with_gap() {
        let instruction = gapped().resolve(&Rect::new(4500, 500, 200, 200)).unwrap();
        assert_eq!(instruction.monitor.index, 1);
        assert_eq!(instruction.local, Rect::new(660, 500, 200, 200));
        assert_eq!(instruction.global_rect(), Rect::new(4500, 500, 200, 200));
    }

    #[test]
    fn selection_in_gap_falls_back_to_nearest_center() {
        let topology = gapped();
        let selection = Rect::new(2000, 500, 200, 200);

        assert_eq!(topology.touching(&selection).count(), 0);

        let choice = topology.choose_monitor(&selection);
        assert_eq!(choice.monitor.index, 0);
        assert_eq!(choice.reason, ChoiceReason::Nearest { distance: 1140 });
    }

    #[test]
    fn selection_in_gap_leaves_nothing_after_clamp() {
        let topology = gapped();
        let result = topology.resolve(&Rect::new(2000, 500, 200, 200));
        assert_eq!(
            result,
            Err(TopologyError::EmptyAfterClamp {
                monitor: topology.monitors()[0]
            })
        );
    }

    #[test]
    fn gap_selection_near_right_monitor_picks_it() {
        let topology = gapped();
        // centre 3700: 2740 from monitor 0, 1100 from monitor 1
        let choice = topology.choose_monitor(&Rect::new(3600, 500, 200, 200));
        assert_eq!(choice.monitor.index, 1);
        assert_eq!(choice.reason, ChoiceReason::Nearest { distance: 1100 });
    }

    #[test]
    fn spanning_selection_picks_largest_overlap() {
        let topology = ScreenTopology::from_geometries([
            Rect::new(0, 0, 1920, 1080),
            Rect::new(1920, 0, 1920, 1080),
        ])
        .unwrap();

        // 20 columns on monitor 0, 180 on monitor 1
        let instruction = topology.resolve(&Rect::new(1900, 500, 200, 200)).unwrap();
        assert_eq!(instruction.monitor.index, 1);
        assert_eq!(instruction.local, Rect::new(0, 500, 180, 200));

        let touching: Vec<_> = topology
            .touching(&Rect::new(1900, 500, 200, 200))
            .map(|(m, area)| (m.index, area))
            .collect();
        assert_eq!(touching, vec![(0, 4000), (1, 36000)]);
    }

    #[test]
    fn equal_overlap_prefers_earlier_monitor() {
        let topology = ScreenTopology::from_geometries([
            Rect::new(1920, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1080),
        ])
        .unwrap();

        // 100 columns on each side of the shared edge
        let instruction = topology.resolve(&Rect::new(1820, 0, 200, 100)).unwrap();
        assert_eq!(instruction.monitor.index, 0);
        assert_eq!(instruction.local, Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn equal_center_distance_prefers_earlier_monitor() {
        let topology = ScreenTopology::from_geometries([
            Rect::new(0, 0, 1000, 1000),
            Rect::new(3000, 0, 1000, 1000),
        ])
        .unwrap();

        // centre 2000 is 1500 away from both monitor centres
        let choice = topology.choose_monitor(&Rect::new(1900, 0, 200, 100));
        assert_eq!(choice.monitor.index, 0);
    }

    #[test]
    fn vertical_gap_uses_center_x_only() {
        // Monitors stacked vertically with a gap, different horizontal centres
        let topology = ScreenTopology::from_geometries([
            Rect::new(0, 0, 1920, 1080),
            Rect::new(400, 1500, 1920, 1080),
        ])
        .unwrap();

        // Sits just above the lower monitor but is horizontally closer to the upper one
        let choice = topology.choose_monitor(&Rect::new(0, 1400, 100, 50));
        assert_eq!(choice.monitor.index, 0);
    }

    #[test]
    fn local_rect_is_clamped_to_monitor() {
        let topology = gapped();
        let instruction = topology.resolve(&Rect::new(1800, -100, 400, 300)).unwrap();
        assert_eq!(instruction.monitor.index, 0);
        assert_eq!(instruction.local, Rect::new(1800, 0, 120, 200));
    }

    #[test]
    fn resolved_rects_stay_inside_their_monitor() {
        let topology = ScreenTopology::from_geometries([
            Rect::new(-1280, 200, 1280, 1024),
            Rect::new(0, 0, 2560, 1440),
            Rect::new(2560, -400, 1080, 1920),
        ])
        .unwrap();

        for x in (-1600..4000).step_by(173) {
            for y in (-600..1800).step_by(131) {
                let selection = Rect::new(x, y, 240, 180);
                match topology.resolve(&selection) {
                    Ok(instruction) => {
                        let bounds = instruction.monitor.geometry;
                        assert!(instruction.local.x >= 0 && instruction.local.y >= 0);
                        assert!(instruction.local.w > 0 && instruction.local.h > 0);
                        assert!(instruction.local.right() <= bounds.w);
                        assert!(instruction.local.bottom() <= bounds.h);
                    }
                    Err(TopologyError::EmptyAfterClamp { .. }) => {
                        assert_eq!(topology.touching(&selection).count(), 0);
                    }
                    Err(other) => panic!("unexpected error {other:?}"),
                }
            }
        }
    }

    #[test]
    fn resolve_is_deterministic() {
        let topology = gapped();
        let selection = Rect::new(1700, 300, 500, 400);
        assert_eq!(topology.resolve(&selection), topology.resolve(&selection));
    }

    #[test]
    fn combined_geometry_spans_all_monitors() {
        assert_eq!(gapped().combined_geometry(), Rect::new(0, 0, 5760, 1080));

        let offset = ScreenTopology::from_geometries([
            Rect::new(0, 0, 1920, 1080),
            Rect::new(-1280, -300, 1280, 1024),
        ])
        .unwrap();
        assert_eq!(offset.combined_geometry(), Rect::new(-1280, -300, 3200, 1380));
    }

    #[test]
    fn single_monitor_topology() {
        let topology = ScreenTopology::from_geometries([Rect::new(0, 0, 1280, 720)]).unwrap();
        assert_eq!(topology.combined_geometry(), Rect::new(0, 0, 1280, 720));
        let instruction = topology.resolve(&Rect::new(10, 10, 50, 50)).unwrap();
        assert_eq!(instruction.monitor.index, 0);
    }
}
