mod error;
mod id;
mod traits;

pub mod filesystem;

pub use error::ImageStoreError;
pub use id::ImageId;
pub use traits::{ImageStore, StoredImage};

/// Public id of the system-wide default placeholder image.
///
/// The placeholder is never uploaded through the store and must never be
/// destroyed; callers check against this constant before releasing an image.
pub const PLACEHOLDER_IMAGE_ID: &str = "default_profile";
