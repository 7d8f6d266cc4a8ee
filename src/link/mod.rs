//! Symbolic links (`user({id: app.user.id})`) and in-app anchor navigation.
//!
//! A link names a route and optionally a parameter expression. The name is
//! everything before the first `(`, so route names cannot contain `(`; a
//! stray parenthesis is not rejected, it just produces a different split.

mod anchor;
mod core;
pub mod expr;

pub use anchor::{AnchorElement, AnchorInterceptor, ClickDecision, ClickDisposition};
pub use self::core::{LinkBinding, LinkExpression, LinkResolver};
pub use expr::ParamsExpr;
