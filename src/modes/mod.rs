pub mod headless;
pub mod watch;

pub use headless::{HeadlessMode, RunConfig};
pub use watch::{WatchMode, WatchOptions, WatchSpeed};
