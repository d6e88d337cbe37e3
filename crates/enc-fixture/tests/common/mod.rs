use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("enc")
        .join(name)
}

pub const ONE_ANGLE: &str = "oneangle_10k_50bins_nu1-00.py";
pub const TWO_ANGLE: &str = "twoangle_integrated_10k_50bins_nus_1-00_1-00.py";
