//! Timed, nested log sections.
//!
//! Entering a section logs its title indented by the current nesting
//! depth; dropping the guard logs the elapsed time. The depth counter is
//! only used for indentation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::info;

static DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Guard for an open log section.
#[must_use = "the section closes when the guard is dropped"]
pub struct LogSection {
    title: String,
    depth: usize,
    started: Instant,
}

impl LogSection {
    pub fn enter(title: impl Into<String>) -> Self {
        let title = title.into();
        let depth = DEPTH.fetch_add(1, Ordering::Relaxed);
        info!("{}▶ {}", indent(depth), title);
        Self {
            title,
            depth,
            started: Instant::now(),
        }
    }

    /// Logs a line inside the section, one level deeper than its title.
    pub fn note(&self, message: impl AsRef<str>) {
        info!("{}{}", indent(self.depth + 1), message.as_ref());
    }
}

impl Drop for LogSection {
    fn drop(&mut self) {
        DEPTH.fetch_sub(1, Ordering::Relaxed);
        info!(
            "{}◀ {} ({} ms)",
            indent(self.depth),
            self.title,
            self.started.elapsed().as_millis()
        );
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indentation_grows_with_depth() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "    ");
    }
}
