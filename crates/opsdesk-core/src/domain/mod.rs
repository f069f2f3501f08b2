pub mod contact;
pub mod phone;

pub use contact::{normalize_contacts, Contact, ContactOrigin, RawContact};
pub use phone::{digits_only, normalize_phone_suffix, phone_suffix, SUFFIX_LEN};
