//! CLI command handlers. Each command is in its own file for clarity.

mod add;
mod cancel;
mod pause;
mod resume;
mod run;
mod status;
mod stop_all;

pub use add::{run_add, AddKind};
pub use cancel::run_cancel;
pub use pause::run_pause;
pub use resume::run_resume;
pub use run::run_run;
pub use status::run_status;
pub use stop_all::run_stop_all;
