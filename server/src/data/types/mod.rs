//! Shared data types for the data layer

mod enums;
mod transactional;

pub use enums::{RaceEventSort, SortDirection, UserRole};

pub use transactional::{
    CheckpointRow, CompetitionRow, ListRaceEventsParams, NewOrganizer, NewRace, NewRaceEvent,
    OrganizerRow, ParticipantRow, RaceEventRow, RaceEventWithRaces, RaceRow, TimingRow,
    TimingWithRelations, UserRow,
};
