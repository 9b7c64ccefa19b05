//! Keeps the local [`SceneStore`] in step with what elements report.

use glmesh_model::SceneStore;
use glmesh_wire::config::STATUS_SUCCESS;
use glmesh_wire::{Address, ConfigStatus};

use crate::flow::TaskOutcome;
use crate::transport::MeshMessage;

/// Apply a Scene Register Status from `source`: scenes it lists gain the
/// address, every other scene loses it. Failed statuses change nothing.
/// Returns how many scenes changed.
pub fn apply_scene_register(
    store: &mut SceneStore,
    source: Address,
    status: &ConfigStatus,
) -> usize {
    let ConfigStatus::SceneRegister { status: code, scenes, .. } = status else {
        return 0;
    };
    if *code != STATUS_SUCCESS {
        log::debug!("scenes: ignoring register status {code:#04x} from {source}");
        return 0;
    }
    let numbers: Vec<u16> = store.iter().map(|scene| scene.number()).collect();
    let mut changed = 0;
    for number in numbers {
        let updated = if scenes.contains(&number) {
            store.register(number, source)
        } else {
            store.unregister(number, source)
        };
        changed += usize::from(updated);
    }
    for number in scenes.iter().filter(|number| store.get(**number).is_none()) {
        log::debug!("scenes: {source} holds unknown scene {number}");
    }
    changed
}

/// Fold the register replies collected by a finished flow into `store`.
pub fn apply_outcomes(store: &mut SceneStore, outcomes: &[TaskOutcome]) -> usize {
    outcomes
        .iter()
        .filter_map(|outcome| match (&outcome.response, outcome.source) {
            (Some(MeshMessage::Config(status)), Some(source)) => Some((status, source)),
            _ => None,
        })
        .map(|(status, source)| apply_scene_register(store, source, status))
        .sum()
}
