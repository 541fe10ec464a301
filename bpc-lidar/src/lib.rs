/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

pub mod npy;
pub mod patches;
pub mod tiles;

pub use crate::npy::{read_npy, write_npy};
pub use crate::patches::{chip_points, PointPatch, DEFAULT_PATCH_CAPACITY};
pub use crate::tiles::{list_tile_files, load_tile_directory, read_tile_points};
