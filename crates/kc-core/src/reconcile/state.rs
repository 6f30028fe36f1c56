use std::collections::BTreeSet;

use kc_model::EntityLabel;

/// Commands a single tick has to issue.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Plan {
    /// Desired but not yet present in the world.
    pub to_spawn: Vec<EntityLabel>,
    /// Known from the previous tick but no longer desired.
    pub to_despawn: Vec<EntityLabel>,
}

impl Plan {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.to_spawn.is_empty() && self.to_despawn.is_empty()
    }
}

/// Reconciler memory carried between ticks.
///
/// - `known`: the desired set of the last committed tick.
/// - `spawned`: labels currently believed to exist in the world. Grows on spawn, shrinks on
///   despawn, so a workload recreated under an old name is spawned again.
///
/// Owned by the reconciler task alone.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReconcileState {
    known: BTreeSet<EntityLabel>,
    spawned: BTreeSet<EntityLabel>,
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a world that already holds `labels`.
    pub fn from_existing(labels: impl IntoIterator<Item = EntityLabel>) -> Self {
        let known: BTreeSet<EntityLabel> = labels.into_iter().collect();
        Self {
            spawned: known.clone(),
            known,
        }
    }

    /// Replace the known set without touching the spawned registry.
    ///
    /// Used once at startup so that instances gone before the first tick are despawned.
    pub fn seed_known(&mut self, labels: impl IntoIterator<Item = EntityLabel>) {
        self.known = labels.into_iter().collect();
    }

    #[inline]
    pub fn known(&self) -> &BTreeSet<EntityLabel> {
        &self.known
    }

    #[inline]
    pub fn spawned(&self) -> &BTreeSet<EntityLabel> {
        &self.spawned
    }

    pub fn plan(&self, desired: &BTreeSet<EntityLabel>) -> Plan {
        Plan {
            to_spawn: desired.difference(&self.spawned).cloned().collect(),
            to_despawn: self.known.difference(desired).cloned().collect(),
        }
    }

    /// Record that every command of `plan` reached the world.
    pub fn commit(&mut self, desired: BTreeSet<EntityLabel>, plan: &Plan) {
        self.spawned.extend(plan.to_spawn.iter().cloned());
        for label in &plan.to_despawn {
            self.spawned.remove(label);
        }
        self.known = desired;
    }
}
