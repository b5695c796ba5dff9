pub mod account;
pub mod company;
pub mod envelope;
pub mod fields;
pub mod reservation;
pub mod user;

pub use account::{Account, AuthPayload, LoginRequest, Role};
pub use company::{Company, CompanyUpdate, NewCompany, ValidCompany};
pub use envelope::Envelope;
pub use reservation::{
    NewReservation, Reservation, ReservationChanges, ReservationStatus, ReservationUpdate,
    ValidReservation,
};
pub use user::{NewUser, User, UserUpdate, ValidUser};
