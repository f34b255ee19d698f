pub mod seats;

pub use seats::SeatService;
