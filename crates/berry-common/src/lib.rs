pub mod diagnostic;
pub mod error;
pub mod source;
pub mod span;
pub mod token;
pub mod ty;
