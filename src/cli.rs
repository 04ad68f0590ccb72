//! CLI: model documents → (resolved model | Rust codecs)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use json_codegen::{generate, GenConfig, Model, ModelSources};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Rust JSON codecs (object encoders/decoders and tagged unions) from a model document
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit Rust types with their JSON codecs
    Generate(GenerateOut),
    /// validate and print the resolved model as JSON
    Model(ModelOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer selecting the model inside each document (e.g. /definitions)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is a model document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more model files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// generation settings file (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// discard a literal `false` where a non-boolean field value is expected
    #[arg(long)]
    accept_false: bool,

    /// path generated code imports the runtime from
    #[arg(long)]
    runtime_path: Option<String>,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ModelOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_model(&self) -> Result<Model> {
        let sources = ModelSources {
            patterns: self.input.clone(),
            json_pointer: self.json_pointer.clone(),
            jq_expr: self.jq_expr.clone(),
        };
        let model = sources.load_model().context("failed to load model")?;
        Ok(model)
    }
}

impl GenerateOut {
    fn gen_config(&self) -> Result<GenConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GenConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => GenConfig::default(),
        };
        if self.accept_false {
            config.accept_false = true;
        }
        if let Some(runtime_path) = self.runtime_path.as_ref() {
            config.runtime_path = runtime_path.clone();
        }
        Ok(config)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let config = target.gen_config()?;
                log::debug!("generation config: {config:?}");
                let model = target.input_settings.load_model()?;
                let rust_src = generate(&model, &config);
                write_output(target.out.as_deref(), &rust_src)
            }
            Command::Model(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }
                let model = target.input_settings.load_model()?;
                let model_src = serde_json::to_string_pretty(&model)?;
                write_output(target.out.as_deref(), &model_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    let Some(out) = out else {
        println!("{contents}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
    log::info!("wrote {}", out.display());
    Ok(())
}
