//! `vars` subcommand: print the default variable set and exit.

use anyhow::Result;

use crate::cli::VarsOpts;
use crate::host::{HostInfo, SystemHost};
use crate::vars;

/// Print the resolved defaults for the real host.
///
/// # Errors
///
/// Infallible today; kept fallible for symmetry with the other commands.
pub fn run(opts: &VarsOpts) -> Result<()> {
    let host = SystemHost;
    println!("{}", render(opts, &host));
    Ok(())
}

/// The sorted `# KEY=VALUE` block for the given host.
#[must_use]
pub fn render(opts: &VarsOpts, host: &dyn HostInfo) -> String {
    vars::export(&vars::defaults(&opts.shell, None, host))
}
