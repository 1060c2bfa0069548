//! Cowl host driver.
//!
//! Wires the evaluation core to the outside world: tracing output,
//! configuration from the environment, a [`Session`] that runs whole
//! programs, and diagnostics rendered against source text.

pub mod demos;
mod report;
mod session;

pub use report::render_error;
pub use session::{Session, SessionConfig};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `COWL_LOG=cowl_eval=debug` (or `RUST_LOG`); set
/// `COWL_LOG_TREE=1` for indented span trees instead of flat lines.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if a filter is set
        let Some(directives) = std::env::var("COWL_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
        else {
            return;
        };
        let filter = EnvFilter::new(directives);
        let registry = tracing_subscriber::registry().with(filter);

        if std::env::var("COWL_LOG_TREE").is_ok_and(|v| v == "1") {
            registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .init();
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .init();
        }
    });
}
