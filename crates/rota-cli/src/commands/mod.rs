pub mod calendar;
pub mod complete;
pub mod migrate;
pub mod next;
pub mod preview;
