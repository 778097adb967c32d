pub mod participant;
pub mod winner;

pub use participant::Entity as ParticipantEntity;
pub use winner::Entity as WinnerEntity;
