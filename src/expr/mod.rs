pub mod codec;
pub mod expression;
pub mod formatter;
pub mod operator;

pub use codec::*;
pub use expression::*;
pub use operator::*;
