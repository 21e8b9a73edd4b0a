//! `acldb run` command.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use acldb_kernel::Kernel;
use anyhow::{Context, Result};
use clap::Args;

use crate::opts::GlobalOpts;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Program files, run in the order given
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn cmd_run(opts: &GlobalOpts, args: &RunArgs) -> Result<ExitCode> {
    let mut kernel = Kernel::new(opts.kernel_config());
    let mut stdout = std::io::stdout().lock();

    for (idx, path) in args.files.iter().enumerate() {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read program {}", path.display()))?;
        let outcome = kernel.run_program(&text);
        tracing::debug!(file = %path.display(), verdict = ?outcome.verdict, "program finished");
        stdout.write_all(outcome.to_ndjson().as_bytes())?;

        if outcome.shutdown {
            let skipped = args.files.len() - idx - 1;
            if skipped > 0 {
                tracing::info!(skipped, "admin exit; remaining programs not run");
            }
            break;
        }
    }
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
