//! Client-side routing: the static route table and the authentication guard.

pub mod guard;
pub mod router;
pub mod routes;

pub use guard::{GuardDecision, NavigationGuard};
pub use router::{Navigation, Router};
pub use routes::{RouteDef, RouteMatch, RouteTable, View};
