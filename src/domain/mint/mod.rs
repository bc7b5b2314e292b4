pub mod outcome;
pub mod single_flight;

pub use outcome::{MintOutcome, MintPhase, MintReceipt, Notification, NotificationLevel};
pub use single_flight::{FlightGuard, SingleFlight};
