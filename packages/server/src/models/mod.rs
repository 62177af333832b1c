pub mod artpiece;
pub mod auth;
pub mod collection;
pub mod enquiry;
pub mod like;
pub mod profile;
pub mod shared;
