pub mod day;
pub mod seat;

pub use day::Day;
pub use seat::{Seat, SeatChange};
