//! SelPanel - Selection panel manager driven by JSON-lines scripts
//!
//! Reads commands from a file or stdin, one per line, and prints one result
//! record per command followed by the listener calls it caused.

mod event_bus;
mod script;

use log::{info, warn};
use sel_backend::{create_backend, detect_backend, BackendKind};
use sel_panel::{SelectionManager, Session, SessionConfig, SYSCAP_SELECTION};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

#[derive(Debug, Default, PartialEq)]
struct Options {
    script: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                options.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ if options.script.is_none() => options.script = Some(PathBuf::from(&arg)),
            _ => return Err(format!("unexpected argument {}", arg)),
        }
    }
    Ok(options)
}

fn load_config(path: Option<&PathBuf>) -> SessionConfig {
    match path.cloned().or_else(SessionConfig::default_path) {
        Some(path) => {
            info!("Loading config from {}", path.display());
            SessionConfig::load(&path)
        }
        None => SessionConfig::default(),
    }
}

fn backend_kind(config: &SessionConfig) -> BackendKind {
    match config.backend.as_deref() {
        Some(name) => BackendKind::from_name(name).unwrap_or_else(|| {
            warn!("Unknown backend '{}' in config, detecting instead", name);
            detect_backend()
        }),
        None => detect_backend(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args(std::env::args().skip(1))?;
    let config = load_config(options.config.as_ref());

    if !config.has_capability(SYSCAP_SELECTION) {
        warn!("{} not available, nothing to do", SYSCAP_SELECTION);
        return Ok(());
    }

    let kind = backend_kind(&config);
    info!("Using {} backend", kind);
    let manager = SelectionManager::new(Session::new(&config, create_backend(kind)));

    let reader: Box<dyn BufRead> = match &options.script {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut rx = event_bus::subscribe();
    let mut runner = script::Runner::new(manager);
    let mut count = 0;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        println!("{}", runner.run_line(line).await);
        for event in runner.settle(&mut rx).await {
            println!("{}", event);
        }
        count += 1;
    }

    runner.close();
    info!("Ran {} command(s)", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
        assert_eq!(
            parse_args(args(&["run.jsonl", "--config", "c.json"])).unwrap(),
            Options {
                script: Some("run.jsonl".into()),
                config: Some("c.json".into()),
            }
        );
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["a", "b"])).is_err());
    }

    #[test]
    fn test_backend_from_config() {
        let mut config = SessionConfig {
            backend: Some("none".into()),
            ..SessionConfig::default()
        };
        assert_eq!(backend_kind(&config), BackendKind::Unavailable);
        config.backend = Some("Headless".into());
        assert_eq!(backend_kind(&config), BackendKind::Headless);
    }
}
