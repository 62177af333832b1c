
mod artpiece;
mod enquiry;
mod like;
