pub mod bookings;
pub mod earnings;
pub mod lifecycle;
pub mod matching;
pub mod notifications;
pub mod pricing;
pub mod ratings;
pub mod routing;
