//! waterlog - houseplant watering diary
//!
//! Recommends how much water a plant needs from its pot, species, pot
//! material and the owner's latest climate reading, and corrects each
//! recommendation with the error recorded at the previous watering.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;

pub use config::Config;
pub use core::{Recommendation, WateringEvent, WateringRequest, WateringService};
pub use error::{ErrorCategory, Result, WaterlogError};
pub use storage::{DiaryStore, FileDiaryStore, MemoryDiaryStore};

// CLI commands
pub use cli::{HistoryCommand, RecommendCommand, RegisterCommand, WaterCommand};
