use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use knockon_core::config::Config;
use knockon_core::state::ExplorerState;
use knockon_gen::generator::TextGenerator;
use knockon_gen::groq::{GroqClient, GroqConfig};

mod pool;
mod ui;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut policy_file = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            "--version" | "-V" | "version" => {
                println!("knockon {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            other if other.starts_with('-') => {
                print_help();
                return Err(format!("unknown flag: {other}").into());
            }
            path => {
                if policy_file.is_some() {
                    return Err("expected at most one policy file".into());
                }
                policy_file = Some(PathBuf::from(path));
            }
        }
    }

    let config = load_config();
    let mut groq = GroqConfig::from_env();
    if let Some(model) = config.model.model.clone() {
        groq.model = model;
    }
    if let Some(base_url) = config.model.base_url.clone() {
        groq.base_url = base_url;
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(GroqClient::new(groq)?);

    let state = ExplorerState::new(config);
    ui::run(state, generator, policy_file)
}

fn load_config() -> Config {
    let Some(path) = dirs::config_dir().map(|dir| dir.join("knockon/config.toml")) else {
        return Config::default();
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: ignoring malformed {}: {err}", path.display());
            Config::default()
        }
    }
}

fn print_help() {
    println!("knockon {}", env!("CARGO_PKG_VERSION"));
    println!("Usage:");
    println!("  knockon [FILE]");
    println!("  knockon --help");
    println!("  knockon --version");
    println!();
    println!("FILE is a plain-text policy loaded at startup. Set GROQ_API_KEY to");
    println!("reach the generation service; without it every request comes back");
    println!("as an error effect.");
}
