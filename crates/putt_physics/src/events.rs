//! Touch events, polled once per step

use crate::body::RigidBodyHandle;
use crate::collider::ColliderHandle;

/// Whether a pair started or stopped touching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    /// Pair started touching
    Found,
    /// Pair stopped touching
    Lost,
}

/// A touch event between two shapes
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    /// First shape
    pub collider1: ColliderHandle,
    /// Second shape
    pub collider2: ColliderHandle,
    /// Owning body of the first shape
    pub body1: Option<RigidBodyHandle>,
    /// Owning body of the second shape
    pub body2: Option<RigidBodyHandle>,
    /// Found or lost
    pub kind: TouchKind,
}

impl TouchEvent {
    /// Check if this is a touch-found event
    pub fn is_found(&self) -> bool {
        self.kind == TouchKind::Found
    }

    /// Check if this is a touch-lost event
    pub fn is_lost(&self) -> bool {
        self.kind == TouchKind::Lost
    }

    /// Check whether the given body takes part in this event
    pub fn involves(&self, body: RigidBodyHandle) -> bool {
        self.body1 == Some(body) || self.body2 == Some(body)
    }

    /// The body on the other side of the pair from `body`
    pub fn other_body(&self, body: RigidBodyHandle) -> Option<RigidBodyHandle> {
        if self.body1 == Some(body) {
            self.body2
        } else if self.body2 == Some(body) {
            self.body1
        } else {
            None
        }
    }
}

/// Events gathered during the most recent `step`, in solver order
#[derive(Debug, Default)]
pub struct EventCollector {
    /// Touch events this frame
    pub touch_events: Vec<TouchEvent>,
}

impl EventCollector {
    /// Create a new event collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all collected events
    pub fn clear(&mut self) {
        self.touch_events.clear();
    }

    /// Get contact start events
    pub fn contacts_found(&self) -> impl Iterator<Item = &TouchEvent> {
        self.touch_events.iter().filter(|e| e.is_found())
    }

    /// Get contact end events
    pub fn contacts_lost(&self) -> impl Iterator<Item = &TouchEvent> {
        self.touch_events.iter().filter(|e| e.is_lost())
    }
}
