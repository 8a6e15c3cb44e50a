mod attribute;
mod class;
mod constant_pool;
mod constants;
mod field;
mod method;

pub use attribute::*;
pub use class::*;
pub use constant_pool::*;
pub use constants::*;
pub use field::*;
pub use method::*;
