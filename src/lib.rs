pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::db::SeaOrmStore;
pub use crate::adapters::http::AppState;
pub use crate::adapters::memory::InMemoryStore;
pub use crate::config::AppConfig;
pub use crate::core::draw::DrawService;
pub use crate::domain::model::{Operator, Participant, Winner, WinnerDetails};
pub use crate::utils::error::{RaffleError, Result};
