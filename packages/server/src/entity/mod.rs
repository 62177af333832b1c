pub mod art_collection;
pub mod artpiece;
pub mod artpiece_hashtag;
pub mod enquiry;
pub mod hashtag;
pub mod like;
pub mod profile;
pub mod user;
