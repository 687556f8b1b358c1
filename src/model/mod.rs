//! Pure data structures shared by every component. [`Order`] also implements
//! [`ActorEntity`](crate::framework::ActorEntity) (see [`crate::order_actor`]).

pub mod coordinate;
pub mod driver;
pub mod feature;
pub mod order;
pub mod route;

pub use coordinate::*;
pub use driver::*;
pub use feature::*;
pub use order::*;
pub use route::*;
