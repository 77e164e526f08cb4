//! Per-navigation-type stage lists.

use std::collections::HashMap;

use crate::route::RouteType;

/// One step of a transition pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Follow a static redirect declared by the matched leaf.
    ResolveLocation,
    /// Guard diff: leave, before_each, enter or update.
    Guards,
    /// Deferred payload loaders, joined.
    Payload,
    /// Epoch check, current route, history write, render notification.
    Commit,
    AfterEach,
    /// Hand the target to the fallback collaborator without committing.
    OpenWindow,
}

const EXPLICIT: &[Stage] = &[
    Stage::ResolveLocation,
    Stage::Guards,
    Stage::Payload,
    Stage::Commit,
    Stage::AfterEach,
];

const REPLAY: &[Stage] = &[Stage::Guards, Stage::Payload, Stage::Commit, Stage::AfterEach];

const WINDOW: &[Stage] = &[Stage::ResolveLocation, Stage::OpenWindow];

/// Fixed mapping from navigation type to its stages, built once per router.
#[derive(Debug, Clone)]
pub struct StageTable {
    table: HashMap<RouteType, &'static [Stage]>,
}

impl StageTable {
    pub fn new() -> Self {
        let table = RouteType::ALL
            .iter()
            .map(|&route_type| {
                let stages: &'static [Stage] = match route_type {
                    RouteType::Push | RouteType::Replace | RouteType::Reload => EXPLICIT,
                    RouteType::Back | RouteType::Forward | RouteType::Go | RouteType::Popstate => {
                        REPLAY
                    }
                    RouteType::PushWindow | RouteType::ReplaceWindow => WINDOW,
                    RouteType::Resolve => &[],
                };
                (route_type, stages)
            })
            .collect();
        Self { table }
    }

    pub fn stages(&self, route_type: RouteType) -> &'static [Stage] {
        self.table.get(&route_type).copied().unwrap_or(&[])
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_an_entry() {
        let table = StageTable::new();
        for route_type in RouteType::ALL {
            let stages = table.stages(route_type);
            if route_type == RouteType::Resolve {
                assert!(stages.is_empty());
            } else {
                assert!(!stages.is_empty(), "{} has no stages", route_type);
            }
        }
    }

    #[test]
    fn test_replays_skip_location_resolution() {
        let table = StageTable::new();
        assert_eq!(table.stages(RouteType::Popstate)[0], Stage::Guards);
        assert_eq!(table.stages(RouteType::Push)[0], Stage::ResolveLocation);
        assert!(!table.stages(RouteType::PushWindow).contains(&Stage::Commit));
    }
}
