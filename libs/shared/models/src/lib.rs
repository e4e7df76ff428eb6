pub mod contracts;
pub mod error;
pub mod health;
pub mod reservation;

pub use contracts::*;
pub use error::*;
pub use health::*;
pub use reservation::*;
