#![allow(dead_code)]

use std::path::PathBuf;

use enc_core::errors::EncError;
use enc_fixture::{load_fixture, Fixture};

pub const ONE_ANGLE: &str = "oneangle_10k_50bins_nu1-00.py";
pub const TWO_ANGLE: &str = "twoangle_integrated_10k_50bins_nus_1-00_1-00.py";

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("enc")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn shipped(name: &str) -> Result<Fixture, EncError> {
    Ok(load_fixture(&fixture_path(name))?.fixture)
}
