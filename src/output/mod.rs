mod progress;
mod render;
mod styling;
mod tables;

pub use render::run_terminal;
use styling::{dim, magenta_bold};

/// Prints the pipeboard banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("▦ pipeboard"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Pipeline dashboard for GitLab")
    );
}
