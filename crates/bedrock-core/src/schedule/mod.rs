// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Drives per-frame work from an explicit tick source.
//!
//! The host calls [`FrameScheduler::tick`] once per frame with the frame's
//! delta. Each tick raises the `update` channel, fires the timers that came
//! due, then raises the `late_update` channel. A [`Stopwatch`] can feed
//! wall-clock deltas when the host has no clock of its own.

mod scheduler;
mod timer;

pub use self::scheduler::{FrameScheduler, FrameTime, TimerId};
pub use self::timer::Stopwatch;
