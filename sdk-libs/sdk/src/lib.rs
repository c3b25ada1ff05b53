pub mod address;
pub mod constants;
pub use constants::*;
pub mod discriminator;
pub mod error;
pub mod instruction;
pub mod state;

pub use address::DerivedAddress;
pub use error::{Result, StorefrontSdkError};
