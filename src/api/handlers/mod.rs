pub mod health;
pub use self::health::{health, Health};

pub mod events;
pub use self::events::{events, ErrorBody};
