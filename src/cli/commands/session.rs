//! Session command implementation.
//!
//! Runs the inactivity guard against stdin: every line counts as activity
//! (a named event such as `scroll`, otherwise a key press) and `quit` stops
//! the guard.

use anyhow::{Context, Result};
use hdms_core::DeskConfig;
use hdms_core::model::Role;
use hdms_core::session::{ActivityEvent, AuthState, CookieJar, SessionContext};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::cli::{DeskContext, SessionArgs};
use crate::format::{SessionReport, print_json};
use crate::guard::{ActivitySender, GuardExit, GuardOutcome, GuardTask};

const LOCAL_TOKEN: &str = "local-session";

/// Execute the session command.
///
/// # Errors
///
/// Returns an error if the overrides are invalid or the guard task fails.
pub fn execute(args: &SessionArgs, ctx: &DeskContext) -> Result<()> {
    let mut policy = ctx.config.policy.clone();
    if let Some(limit) = args.limit_secs {
        policy.inactivity_limit_seconds = limit;
    }
    if let Some(interval) = args.interval_ms {
        policy.check_interval_millis = interval;
    }
    policy.validate()?;

    let token = ctx
        .config
        .auth_token
        .clone()
        .unwrap_or_else(|| LOCAL_TOKEN.to_string());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    let outcome = runtime.block_on(guard_session(&args.route, args.role, token, &policy));
    // A pending stdin read must not hold up exit.
    runtime.shutdown_background();
    let outcome = outcome?;

    let report = SessionReport::new(
        &outcome.exit,
        outcome.session.is_authenticated(),
        outcome.session.cookies().set_cookie_headers(),
    );
    if ctx.json {
        return print_json(&report);
    }

    match outcome.exit {
        GuardExit::Expired { idle_for, redirect } => {
            println!(
                "Session expired after {}s without activity; redirect {redirect}",
                idle_for.as_secs()
            );
            for header in &report.set_cookies {
                println!("Set-Cookie: {header}");
            }
        }
        GuardExit::Stopped => println!("Session guard stopped; still signed in."),
    }
    Ok(())
}

async fn guard_session(
    route: &str,
    role: Role,
    token: String,
    policy: &DeskConfig,
) -> Result<GuardOutcome<CookieJar>> {
    let mut session = SessionContext::new(CookieJar::new());
    session.login(AuthState {
        user_id: format!("{role}-cli"),
        role,
        token,
    });
    debug!(route, role = %role, "Session started");

    let task = GuardTask::spawn(route, policy, session);
    tokio::spawn(forward_stdin(task.sender()));
    task.join().await
}

async fn forward_stdin(sender: ActivitySender) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.eq_ignore_ascii_case("quit") {
                    if !sender.stop().await {
                        debug!("Session guard already ended");
                    }
                    return;
                }
                let event = line.parse().unwrap_or(ActivityEvent::KeyDown);
                if !sender.record(event) {
                    return;
                }
            }
            Ok(None) => {
                debug!("stdin closed; waiting for expiry");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                return;
            }
        }
    }
}
