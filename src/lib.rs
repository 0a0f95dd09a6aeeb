// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Some useful re-exports
pub mod prelude;

/// Small iterator and collection helpers shared by the mesh modules
pub mod utils;

/// Interior mutability and reference counting types that switch to their
/// thread-safe counterparts under the `sync` feature.
pub mod sync;

/// The quad-edge data structure, its Euler operators and traversals
pub mod mesh;
