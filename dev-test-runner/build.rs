//! Generate the fixture codecs into OUT_DIR.
//!
//! Every directory under `fixtures/` holds a `model.json` and, optionally, a
//! `config.json` with generation settings. The output is `<dir name>.rs`.
use std::path::Path;

use anyhow::{Context, Result};
use json_codegen::{generate, load_model_file, GenConfig};

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=fixtures");
    let out_dir = std::env::var("OUT_DIR").context("OUT_DIR is not set")?;

    let mut fixtures = std::fs::read_dir("fixtures")
        .context("failed to list fixtures")?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    fixtures.sort();

    for dir in fixtures.iter().filter(|p| p.is_dir()) {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("bad fixture directory {}", dir.display()))?;
        println!("cargo:rerun-if-changed={}", dir.display());

        let model = load_model_file(dir.join("model.json"))
            .with_context(|| format!("fixture {name}: failed to load model"))?;
        let config_path = dir.join("config.json");
        let config = if config_path.exists() {
            GenConfig::from_file(&config_path).with_context(|| format!("fixture {name}: bad config"))?
        } else {
            GenConfig::default()
        };

        let source = generate(&model, &config);
        let target = Path::new(&out_dir).join(format!("{name}.rs"));
        std::fs::write(&target, source).with_context(|| format!("failed to write {}", target.display()))?;
    }
    Ok(())
}
