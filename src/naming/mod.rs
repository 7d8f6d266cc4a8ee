//! Component naming conventions.
//!
//! A component such as `myWidget` is backed by a controller named
//! `MyWidgetController` and a template at
//! `./components/my-widget/my-widget.html` unless the application installs
//! its own mappings through [`NamingConventionBuilder`].

mod core;

pub use self::core::{NameMapping, NamingConvention, NamingConventionBuilder, dash_case};
