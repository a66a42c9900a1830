pub mod artifact;
pub mod conversion;
pub mod definition;
pub mod json;
pub mod signature;

pub use artifact::*;
pub use conversion::*;
pub use definition::*;
pub use signature::*;
