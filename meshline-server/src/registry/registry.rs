use meshline_core::{ParticipantId, RoomId};
use std::collections::HashMap;
use tracing::debug;

/// In-memory room membership with a reverse participant -> room index.
///
/// Both maps are only ever mutated together, so they agree after every call.
/// A room exists exactly as long as it has at least one member.
#[derive(Debug, Default)]
pub struct Registry {
    rooms: HashMap<RoomId, Vec<ParticipantId>>,
    index: HashMap<ParticipantId, RoomId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `participant` to `room` and returns the members that were already
    /// there, in join order.
    ///
    /// A participant registered in another room is moved. Joining the room it
    /// already belongs to changes nothing.
    pub fn join(&mut self, participant: ParticipantId, room: RoomId) -> Vec<ParticipantId> {
        match self.index.get(&participant).cloned() {
            Some(current) if current == room => {
                return self.roster_excluding(&room, &participant);
            }
            Some(_) => {
                self.leave(&participant);
            }
            None => {}
        }

        let members = self.rooms.entry(room.clone()).or_insert_with(|| {
            debug!("Creating room '{}'", room);
            Vec::new()
        });
        let roster = members.clone();
        members.push(participant);
        self.index.insert(participant, room);

        roster
    }

    /// Removes `participant` from its room, deleting the room once empty.
    ///
    /// Returns the room it was in, or `None` if it was not registered.
    pub fn leave(&mut self, participant: &ParticipantId) -> Option<RoomId> {
        let room = self.index.remove(participant)?;

        if let Some(members) = self.rooms.get_mut(&room) {
            members.retain(|id| id != participant);
            if members.is_empty() {
                self.rooms.remove(&room);
                debug!("Room '{}' is empty, removed", room);
            }
        }

        Some(room)
    }

    pub fn room_of(&self, participant: &ParticipantId) -> Option<&RoomId> {
        self.index.get(participant)
    }

    pub fn members(&self, room: &RoomId) -> &[ParticipantId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn participant_count(&self) -> usize {
        self.index.len()
    }

    fn roster_excluding(&self, room: &RoomId, participant: &ParticipantId) -> Vec<ParticipantId> {
        self.members(room)
            .iter()
            .filter(|id| *id != participant)
            .copied()
            .collect()
    }
}
