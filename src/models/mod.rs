//! Domain model — pure data shapes shared by every other component.

pub mod actor;
pub mod appointment;
pub mod blackout;
pub mod counselor;
pub mod enums;
pub mod record;
pub mod schedule;

pub use actor::*;
pub use appointment::*;
pub use blackout::*;
pub use counselor::*;
pub use enums::*;
pub use record::*;
pub use schedule::*;
