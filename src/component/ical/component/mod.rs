mod alarm;
pub use alarm::*;
mod availability;
pub use availability::*;
mod event;
pub use event::*;
mod freebusy;
pub use freebusy::*;
mod journal;
pub use journal::*;
mod participant;
pub use participant::*;
mod timezone;
pub use timezone::*;
mod todo;
pub use todo::*;
