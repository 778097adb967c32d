pub mod admin;
pub mod auth;
pub mod draw;
pub mod messages;
pub mod registration;

pub use crate::domain::model::{Operator, Participant, Winner, WinnerDetails};
pub use crate::domain::ports::{Notifier, ParticipantStore, WinnerStore};
pub use crate::utils::error::Result;
