pub mod booking;
pub mod crew;
pub mod event;
pub mod organization;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use crew::{Crew, CrewMember};
pub use event::{Event, EventMode, EventStatus, EventType};
pub use organization::Organization;
pub use user::{Role, User, UserSummary};
