pub mod algorithms;
pub mod configs;
pub mod errors;
pub mod structures;
pub mod utils;

pub use crate::errors::{BpcError, Result};

pub use rstar;
