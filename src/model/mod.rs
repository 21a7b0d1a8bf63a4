pub mod case;
pub mod collection;
pub mod common;
pub mod interface;
pub mod param;
pub mod script;
pub mod user_context;

pub use case::*;
pub use collection::*;
pub use common::*;
pub use interface::*;
pub use param::*;
pub use script::*;
pub use user_context::*;
