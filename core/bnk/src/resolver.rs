//! The event resolver (§4.G): walks action -> container -> sound edges to
//! compute the transitive set of audio-source ids each event could play.

use crate::types::{ACTION_TYPE_PLAY, AudioSourceId, BankFile, Container, Sound};
use std::collections::{BTreeMap, HashSet};

impl BankFile {
    /// Resolves every event's `resolved_audio_ids` and returns the public
    /// `event_id -> sorted audio ids` mapping. Never fails: unresolvable
    /// references simply contribute nothing.
    pub fn resolve_events(&mut self) -> BTreeMap<String, Vec<u32>> {
        let span = tracing::debug_span!("resolve_events", events = self.events.len());
        let _enter = span.enter();

        let mut output = BTreeMap::new();
        for idx in 0..self.events.len() {
            let actions = self.events[idx].actions.clone();
            let mut resolved = HashSet::new();
            let mut visited_containers = HashSet::new();
            for action_id in &actions {
                self.resolve_target(*action_id, &mut resolved, &mut visited_containers);
            }

            let mut sorted: Vec<u32> = resolved.iter().copied().collect();
            sorted.sort_unstable();

            self.events[idx].resolved_audio_ids = resolved;
            output.insert(self.events[idx].id.to_string(), sorted);
        }

        let unique: HashSet<u32> = output.values().flatten().copied().collect();
        tracing::info!(
            events_resolved = output.len(),
            unique_audio_ids = unique.len(),
            "resolved events"
        );
        output
    }

    /// Dispatches one of an event's own action ids: an action (follow its
    /// "play" target), a container id (expand), a sound id (link), or
    /// nothing known. Only used for the event's top-level action-id list —
    /// expansion *inside* a container (playlist items, children) goes
    /// through [`Self::link_recursive`] instead, which never consults the
    /// actions table.
    fn resolve_target(
        &self,
        target_id: u32,
        resolved: &mut HashSet<AudioSourceId>,
        visited_containers: &mut HashSet<u32>,
    ) {
        if let Some(action) = self.actions.get(&target_id) {
            if action.action_type == Some(ACTION_TYPE_PLAY) {
                if let Some(target) = action.target {
                    self.resolve_target(target, resolved, visited_containers);
                }
            }
            return;
        }
        self.link_recursive(target_id, resolved, visited_containers);
    }

    /// Resolves an id found inside a container's playlist or children: a
    /// sound (link it) or another container (expand it). Unlike
    /// [`Self::resolve_target`], this never checks the actions table — an id
    /// that happens to collide with an action's id is a dangling reference
    /// here, not a followable action.
    fn link_recursive(
        &self,
        target_id: u32,
        resolved: &mut HashSet<AudioSourceId>,
        visited_containers: &mut HashSet<u32>,
    ) {
        if let Some(sound) = self.sounds.get(&target_id) {
            link_sound(sound, &self.audio_file_ids, resolved);
            return;
        }
        if let Some(container) = self.containers.get(&target_id) {
            self.expand_container(container, resolved, visited_containers);
        }
        // Unknown id: dangling reference, contributes nothing.
    }

    /// Recurses into playlist items if non-empty, else children. Containers
    /// are tracked by id in `visited_containers` so a cycle among containers
    /// terminates instead of recursing forever.
    fn expand_container(
        &self,
        container: &Container,
        resolved: &mut HashSet<AudioSourceId>,
        visited_containers: &mut HashSet<u32>,
    ) {
        if !visited_containers.insert(container.id) {
            return;
        }
        if !container.playlist.is_empty() {
            for item in &container.playlist {
                self.link_recursive(item.id, resolved, visited_containers);
            }
        } else {
            for child in &container.children {
                self.link_recursive(*child, resolved, visited_containers);
            }
        }
    }
}

fn link_sound(sound: &Sound, audio_file_ids: &HashSet<AudioSourceId>, resolved: &mut HashSet<AudioSourceId>) {
    if let Some(source) = sound.source {
        if audio_file_ids.contains(&source) {
            resolved.insert(source);
        }
    }
}
