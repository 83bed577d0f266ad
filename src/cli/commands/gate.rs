//! Gate command implementation.

use anyhow::Result;
use hdms_core::session::{AUTH_TOKEN_COOKIE, CookieJar, USER_ROLE_COOKIE};
use hdms_core::{GateDecision, RouteGate};

use crate::cli::{DeskContext, GateArgs};
use crate::format::print_json;

/// Execute the gate command.
///
/// A redirect is a normal outcome and exits successfully.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn execute(args: &GateArgs, ctx: &DeskContext) -> Result<()> {
    let cookies = CookieJar::from_pairs([
        (AUTH_TOKEN_COOKIE, ctx.config.auth_token.as_deref()),
        (USER_ROLE_COOKIE, args.role.as_deref()),
    ])
    .pinned_at(ctx.now);
    let decision = RouteGate::decide(&args.path, &cookies);
    tracing::debug!(path = %args.path, ?decision, "Gate decision");

    if ctx.json {
        return print_json(&decision);
    }
    match decision {
        GateDecision::Allow => println!("allow {}", args.path),
        GateDecision::Redirect { location } => println!("redirect {location}"),
    }
    Ok(())
}
