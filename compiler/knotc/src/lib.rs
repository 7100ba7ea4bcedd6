//! Library half of the `knot` command.
//!
//! Commands write their normal output to a caller-supplied writer and
//! report failures through a [`DiagnosticEmitter`](knot_diagnostic::emitter::DiagnosticEmitter),
//! so they can be exercised without a terminal.

pub mod commands;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber.
///
/// Does nothing unless `RUST_LOG` is set (for example
/// `RUST_LOG=knot_parse=trace`). `tree` selects indented span output
/// instead of one line per event. Safe to call more than once.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if tree {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
