//! Shape id generation.
//!
//! Ids are produced by the session, never by the store. The default
//! generator uses random v4 UUIDs so shapes committed in the same instant (or
//! by two sessions on the same image) never collide; [`SequentialIds`] gives
//! readable, deterministic ids for scripted replays and tests.

use serde::{Deserialize, Serialize};

use crate::model::{ShapeId, ShapeKind};

/// Source of fresh shape ids.
pub trait IdGenerator {
    fn next_id(&mut self, kind: ShapeKind) -> ShapeId;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, _kind: ShapeKind) -> ShapeId {
        ShapeId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Session-scoped monotonic counter: `box-1`, `polygon-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: ShapeKind) -> ShapeId {
        self.next += 1;
        ShapeId::new(format!("{}-{}", kind.name(), self.next))
    }
}

/// Which generator a session should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Uuid,
    Sequential,
}

impl IdStrategy {
    pub fn build(&self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Box::new(UuidIds),
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
        }
    }
}
