// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node key type.
//!
//! Keys are generational: a key to a removed node never aliases a node
//! added later.

use slotmap::new_key_type;

new_key_type! {
    /// Key for any node of a [`Scene`](crate::Scene).
    pub struct NodeKey;
}
