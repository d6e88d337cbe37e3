use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use enc_check::{load_policy, Policy};

pub mod axis;
pub mod compare;
pub mod inspect;
pub mod render;
pub mod scan;
pub mod validate;

/// Tolerance flags shared by `compare` and `scan`.
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// YAML tolerance policy; flags below override its fields.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Absolute tolerance per histogram bin.
    #[arg(long)]
    pub abs_tol: Option<f64>,
    /// Relative tolerance per histogram bin.
    #[arg(long)]
    pub rel_tol: Option<f64>,
    /// Leave underflow and overflow bins out of the comparison.
    #[arg(long)]
    pub skip_outflow: bool,
    /// Compare histograms only, ignoring run metadata.
    #[arg(long)]
    pub no_metadata: bool,
}

impl PolicyArgs {
    pub fn resolve(&self) -> Result<Policy, Box<dyn Error>> {
        let mut policy = match &self.policy {
            Some(path) => load_policy(path)?,
            None => Policy::default(),
        };
        if let Some(abs_tol) = self.abs_tol {
            policy.abs_tol = abs_tol;
        }
        if let Some(rel_tol) = self.rel_tol {
            policy.rel_tol = rel_tol;
        }
        if self.skip_outflow {
            policy.skip_outflow = true;
        }
        if self.no_metadata {
            policy.check_metadata = false;
        }
        policy.validate()?;
        Ok(policy)
    }
}

/// Writes `contents` to `out`, or stdout when no path is given.
pub fn emit(out: Option<&Path>, contents: &str) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, contents)?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => println!("{contents}"),
    }
    Ok(())
}
