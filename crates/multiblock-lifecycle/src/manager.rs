//! Lifecycle manager: conflict resolution, formation and destruction,
//! suppression guards, and load/unload reconciliation.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use multiblock_core::{
    AnchorMarker, BlockPos, EventDisposition, MarkerStore, MemberMarker, Region,
    StructureDefinition, StructureEvent, StructureId, StructureInstance, StructureObserver,
    Visibility, WorldProvider,
};
use multiblock_detector::StructureRecipe;

use crate::index::SpatialIndex;
use crate::registry::StructureRegistry;

/// Owns the set of materialized structures and drives their lifecycle.
///
/// All entry points run synchronously on the world's authoritative
/// simulation step; the manager is the single owner of the spatial index
/// and recipe registry. A multi-threaded host must funnel placement,
/// removal, and region load/unload intents through one serialized stream
/// into a single instance.
///
/// The manager's own marker mutations go through the injected
/// [`MarkerStore`] and detach markers before any host could observe the
/// change, so echoed removal notifications find no marker and short-circuit.
pub struct StructureManager {
    world: Arc<dyn WorldProvider>,
    markers: Arc<dyn MarkerStore>,
    observer: Arc<dyn StructureObserver>,
    registry: StructureRegistry,
    index: SpatialIndex,
    pending: BTreeSet<BlockPos>,
}

impl StructureManager {
    /// Create a manager over the given collaborators.
    pub fn new(
        world: Arc<dyn WorldProvider>,
        markers: Arc<dyn MarkerStore>,
        observer: Arc<dyn StructureObserver>,
    ) -> Self {
        Self {
            world,
            markers,
            observer,
            registry: StructureRegistry::new(),
            index: SpatialIndex::new(),
            pending: BTreeSet::new(),
        }
    }

    /// Register a recipe under a pattern-type name (idempotent overwrite).
    pub fn register_recipe(
        &mut self,
        structure_type: impl Into<String>,
        recipe: Arc<dyn StructureRecipe>,
    ) {
        self.registry.register(structure_type, recipe);
    }

    /// The live structure index.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Number of coordinates awaiting reconciliation.
    pub fn pending_reconciliations(&self) -> usize {
        self.pending.len()
    }

    /// Aggregate id of the structure of a type covering `pos`, if any.
    ///
    /// The first live region containing the cell decides: if its instance
    /// has a different type, or the cell is inside the bounding region
    /// without being a participant, the lookup misses.
    pub fn structure_at(&self, pos: BlockPos, structure_type: &str) -> Option<StructureId> {
        let instance = self.index.instance_at(pos)?;
        if instance.structure_type == structure_type
            && (instance.anchor == pos || instance.members.contains(&pos))
        {
            return Some(instance.aggregate);
        }
        None
    }

    /// A cell tagged as a pattern candidate was placed.
    ///
    /// The tag's declared types are tried in declared order; the first type
    /// whose recipe detects a structure and survives conflict resolution
    /// wins and the rest are not tried.
    pub fn on_candidate_placed(&mut self, pos: BlockPos) {
        let Some(tag) = self.markers.candidate_at(pos) else {
            return;
        };
        for structure_type in &tag.types {
            let Some(recipe) = self.registry.lookup(structure_type) else {
                continue;
            };
            match recipe.detect(pos) {
                Ok(Some(definition)) => {
                    if self.resolve_conflicts_and_form(definition) {
                        return;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%structure_type, %pos, error = %err, "detection aborted");
                }
            }
        }
    }

    /// An anchor marker is being removed by something other than the
    /// manager (block destroyed or replaced).
    ///
    /// No-op when no anchor marker remains at `pos`, which is also what
    /// makes echoes of the manager's own detachments harmless.
    pub fn on_anchor_removed(&mut self, pos: BlockPos) {
        if self.markers.anchor_at(pos).is_some() {
            self.destroy_structure(pos);
        }
    }

    /// A member marker is being removed by something other than the
    /// manager.
    pub fn on_member_removed(&mut self, pos: BlockPos) {
        let Some(member) = self.markers.member_at(pos) else {
            return;
        };
        if self.world.is_loaded(member.anchor) {
            self.destroy_structure(member.anchor);
        } else {
            error!(
                %pos,
                anchor = %member.anchor,
                "structure member removed while the structure is not fully loaded"
            );
        }
    }

    /// A cell is about to take damage.
    ///
    /// Damage to any cell of a not-fully-loaded structure is consumed so
    /// partial data is never mutated.
    pub fn on_block_damaged(&self, pos: BlockPos) -> EventDisposition {
        if self.is_part_of_not_fully_loaded(pos) {
            debug!(%pos, "consumed damage to a not-fully-loaded structure");
            EventDisposition::Consumed
        } else {
            EventDisposition::Pass
        }
    }

    /// A batch placement is about to replace cells.
    ///
    /// Consumed when any target cell belongs to a not-fully-loaded
    /// structure.
    pub fn on_blocks_placed(&self, positions: &[BlockPos]) -> EventDisposition {
        for pos in positions {
            if self.is_part_of_not_fully_loaded(*pos) {
                debug!(%pos, "consumed replacement of a not-fully-loaded structure cell");
                return EventDisposition::Consumed;
            }
        }
        EventDisposition::Pass
    }

    /// A marker-bearing cell became addressable again after its region
    /// streamed in.
    ///
    /// Reconstruction is deferred to [`reconcile`](Self::reconcile):
    /// neighboring cells of the same structure may not be resident yet.
    pub fn on_marked_cell_loaded(&mut self, pos: BlockPos) {
        self.pending.insert(pos);
    }

    /// A world region is about to unload.
    ///
    /// Every instance whose bounding region intersects it is dropped from
    /// the index and its aggregate destroyed; markers stay on the cells and
    /// are serialized with them.
    pub fn on_region_unloading(&mut self, region: &Region) {
        for doomed in self.index.intersecting_regions(region) {
            let Some(instance) = self.index.remove(&doomed) else {
                continue;
            };
            self.observer.on_event(&StructureEvent::BeforeUnloaded {
                structure_type: instance.structure_type.clone(),
                anchor: self.world.handle_at(instance.anchor),
            });
            // The aggregate reference is meaningless once the instance is
            // gone; clear it before the anchor cell pages out.
            self.markers.set_aggregate(instance.anchor, None);
            debug!(
                structure_type = %instance.structure_type,
                anchor = %instance.anchor,
                "structure unloaded"
            );
        }
    }

    /// Drain one reconciliation pass over the pending set.
    ///
    /// Idempotent: revisiting a coordinate is safe, and each entry either
    /// waits for more of its region to load, resolves into at most one
    /// reconstructed instance, or is provably dead and dropped.
    pub fn reconcile(&mut self) {
        let snapshot: Vec<BlockPos> = self.pending.iter().copied().collect();
        for pos in snapshot {
            if !self.world.is_loaded(pos) {
                // The cell paged back out before the pass ran; keep the
                // entry, a future load will requeue or resolve it.
                continue;
            }
            if let Some(marker) = self.markers.anchor_at(pos) {
                if self.try_restore(pos, &marker) {
                    self.pending.remove(&pos);
                }
            } else if let Some(member) = self.markers.member_at(pos) {
                self.reconcile_member(pos, member);
            } else {
                // Marker vanished while pending (structure destroyed).
                self.pending.remove(&pos);
            }
        }
    }

    fn reconcile_member(&mut self, pos: BlockPos, member: MemberMarker) {
        if !self.world.is_loaded(member.anchor) {
            // The anchor cell is not reachable from here; its own chunk
            // load will enqueue it, so this entry is dead weight.
            self.pending.remove(&pos);
            return;
        }
        match self.markers.anchor_at(member.anchor) {
            Some(marker) => {
                if self.try_restore(member.anchor, &marker) {
                    self.pending.remove(&pos);
                }
            }
            None => {
                error!(
                    member = %pos,
                    anchor = %member.anchor,
                    "member marker references a cell with no anchor marker"
                );
                self.pending.remove(&pos);
            }
        }
    }

    /// Rebuild the aggregate instance for a persisted anchor once its whole
    /// region is resident. Returns whether the entry is resolved.
    fn try_restore(&mut self, anchor: BlockPos, marker: &AnchorMarker) -> bool {
        if !self.world.is_region_loaded(&marker.region) {
            return false;
        }
        if self.index.contains_region(&marker.region) {
            // Already reconstructed via another pending cell.
            return true;
        }
        let aggregate = StructureId::new();
        self.markers.set_aggregate(anchor, Some(aggregate));
        self.index.insert(StructureInstance {
            structure_type: marker.structure_type.clone(),
            anchor,
            members: marker.members.clone(),
            region: marker.region,
            aggregate,
        });
        self.observer.on_event(&StructureEvent::Loaded {
            structure_type: marker.structure_type.clone(),
            anchor: self.world.handle_at(anchor),
        });
        debug!(
            structure_type = %marker.structure_type,
            %anchor,
            "structure reconstructed from persisted markers"
        );
        true
    }

    /// Destroy every structure overlapping the definition's footprint, then
    /// form the new one. All-or-nothing: when any overlapping structure is
    /// not resolvable or not fully loaded, nothing is mutated.
    fn resolve_conflicts_and_form(&mut self, definition: StructureDefinition) -> bool {
        let Some(conflicting) = self.conflicting_anchors(&definition) else {
            return false;
        };
        for anchor in &conflicting {
            let Some(marker) = self.markers.anchor_at(*anchor) else {
                continue;
            };
            if !self.world.is_region_loaded(&marker.region) {
                debug!(
                    anchor = %anchor,
                    "skipped formation: conflicting structure is not fully loaded"
                );
                return false;
            }
        }
        for anchor in conflicting {
            self.destroy_structure(anchor);
        }
        self.form(definition);
        true
    }

    /// Anchors of every existing structure whose cells intersect the
    /// footprint. `None` when some overlap cannot be resolved, which makes
    /// the whole placement un-formable.
    fn conflicting_anchors(&self, definition: &StructureDefinition) -> Option<BTreeSet<BlockPos>> {
        let mut anchors = BTreeSet::new();
        for pos in definition.footprint() {
            if self.markers.anchor_at(pos).is_some() {
                anchors.insert(pos);
            } else if let Some(member) = self.markers.member_at(pos) {
                if !self.world.is_loaded(member.anchor) {
                    debug!(
                        member = %pos,
                        anchor = %member.anchor,
                        "skipped formation: overlapping structure's anchor is not loaded"
                    );
                    return None;
                }
                if self.markers.anchor_at(member.anchor).is_none() {
                    error!(
                        member = %pos,
                        anchor = %member.anchor,
                        "member marker references a cell with no anchor marker"
                    );
                    return None;
                }
                anchors.insert(member.anchor);
            }
        }
        Some(anchors)
    }

    fn form(&mut self, definition: StructureDefinition) {
        let region = definition.region();
        let members: Vec<BlockPos> = definition.members.iter().copied().collect();
        let aggregate = StructureId::new();

        self.hide_if_toggleable(definition.anchor);
        let mut marker = AnchorMarker::new(
            definition.structure_type.clone(),
            members.clone(),
            region,
        );
        marker.aggregate = Some(aggregate);
        self.markers.attach_anchor(definition.anchor, marker);

        for member in &members {
            self.hide_if_toggleable(*member);
            self.markers
                .attach_member(*member, MemberMarker::new(definition.anchor));
        }

        self.index.insert(StructureInstance {
            structure_type: definition.structure_type.clone(),
            anchor: definition.anchor,
            members,
            region,
            aggregate,
        });

        debug!(
            structure_type = %definition.structure_type,
            anchor = %definition.anchor,
            %region,
            "structure formed"
        );
        self.observer.on_event(&StructureEvent::Formed {
            structure_type: definition.structure_type.clone(),
            definition,
        });
    }

    /// Reverse of formation. Collaborators are notified first, while the
    /// aggregate is still valid.
    fn destroy_structure(&mut self, anchor: BlockPos) {
        let Some(marker) = self.markers.anchor_at(anchor) else {
            return;
        };
        self.observer.on_event(&StructureEvent::BeforeUnformed {
            structure_type: marker.structure_type.clone(),
            anchor,
        });
        self.index.remove(&marker.region);

        for member in &marker.members {
            self.show_if_toggleable(*member);
            self.markers.detach_member(*member);
        }
        self.show_if_toggleable(anchor);
        self.markers.detach_anchor(anchor);

        debug!(
            structure_type = %marker.structure_type,
            %anchor,
            "structure destroyed"
        );
    }

    /// Whether `pos` belongs to a structure whose bounding region is not
    /// fully resident.
    fn is_part_of_not_fully_loaded(&self, pos: BlockPos) -> bool {
        if let Some(marker) = self.markers.anchor_at(pos) {
            return !self.world.is_region_loaded(&marker.region);
        }
        if let Some(member) = self.markers.member_at(pos) {
            if !self.world.is_loaded(member.anchor) {
                return true;
            }
            return match self.markers.anchor_at(member.anchor) {
                Some(marker) => !self.world.is_region_loaded(&marker.region),
                None => {
                    // Already broken; guarding its cells would wall off
                    // damage forever.
                    error!(
                        member = %pos,
                        anchor = %member.anchor,
                        "member marker references a cell with no anchor marker"
                    );
                    false
                }
            };
        }
        false
    }

    fn hide_if_toggleable(&self, pos: BlockPos) {
        self.set_visibility_if_toggleable(pos, Visibility::Hidden);
    }

    fn show_if_toggleable(&self, pos: BlockPos) {
        self.set_visibility_if_toggleable(pos, Visibility::Visible);
    }

    fn set_visibility_if_toggleable(&self, pos: BlockPos, visibility: Visibility) {
        let handle = self.world.handle_at(pos);
        if handle
            .kind()
            .is_some_and(|kind| kind.has_hidden_variant)
        {
            self.world.set_visibility(pos, visibility);
        }
    }
}
