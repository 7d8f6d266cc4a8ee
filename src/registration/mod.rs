//! Deferred route-configuration registration.
//!
//! Controllers announce their route configuration while the application is
//! still bootstrapping, usually before the route matcher exists. The
//! [`RouteRegistrationQueue`] buffers those announcements and replays them
//! into the matcher once it attaches.

mod core;

pub use self::core::{
    RegistrationRecord, RouteConfig, RouteConfigConsumer, RouteDefinition,
    RouteRegistrationQueue, route_config_from_json,
};
