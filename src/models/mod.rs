pub mod booking;
pub mod earnings;
pub mod rating;
pub mod service_category;

pub use booking::{Booking, BookingStatus, Coordinates, Location, Trigger};
pub use earnings::Earnings;
pub use rating::{Rating, RatingSummary};
pub use service_category::{ServiceCategory, ServiceKind};
