/*
 * Copyright (c) godot-rust; Bromeon and contributors.
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Engine classes of the test API, bound the same way as the classes built into `gdbind`, plus one extension class.

mod json;
mod label;
mod node;
mod player;
mod resource;

pub use json::Json;
pub use label::{CanvasItem, Control, Label, LabelApi, LabelRaw};
pub use node::{Node, NodeApi, NodeRaw};
pub use player::{process_time, ready_calls, Player, PLAYER_CLASS};
pub use resource::{Resource, ResourceApi, ResourceRaw};
