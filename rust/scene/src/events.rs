// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Change notifications.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::keys::NodeKey;

/// Event tag carried by a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// Something about the node changed. Present on every notification.
    Modified,
    /// Control points of a markup node changed
    PointModified,
    /// Mesh of a model node changed
    MeshModified,
    /// The node's own matrix or any transform above it changed
    TransformModified,
}

impl ChangeEvent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChangeEvent::Modified => "Modified",
            ChangeEvent::PointModified => "PointModified",
            ChangeEvent::MeshModified => "MeshModified",
            ChangeEvent::TransformModified => "TransformModified",
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event tags of one notification, without duplicates.
pub type ChangeEvents = SmallVec<[ChangeEvent; 4]>;

/// One batch of changes to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub node: NodeKey,
    pub events: ChangeEvents,
}

impl ChangeNotification {
    /// True if the notification carries `event`.
    #[inline]
    pub fn contains(&self, event: ChangeEvent) -> bool {
        self.events.contains(&event)
    }

    /// True if the notification carries any of `events`.
    pub fn matches_any(&self, events: &[ChangeEvent]) -> bool {
        events.iter().any(|e| self.contains(*e))
    }
}

/// Add `event` to `events` unless already present.
#[inline]
pub(crate) fn push_unique(events: &mut ChangeEvents, event: ChangeEvent) {
    if !events.contains(&event) {
        events.push(event);
    }
}
