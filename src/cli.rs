use crate::error::GrabError;
use crate::format::{Quality, VideoFormat};
use crate::manager::DownloadManager;
use crate::stats::DashboardSnapshot;
use log::{error, warn};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;

const HELP: &str = "\
commands:
  add <url> [format] [quality]   start a download (defaults: mp4 1080p)
  pause <id>                     pause a running download
  resume <id>                    resume a paused or failed download
  remove <id>                    delete an entry
  list                           show the dashboard
  stats                          show counters only
  export                         print the dashboard as JSON
  formats                        show the format catalog
  toggle <id>                    enable/disable a catalog format
  help                           show this message
  quit                           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        url: String,
        format: VideoFormat,
        quality: Quality,
    },
    Pause(u32),
    Resume(u32),
    Remove(u32),
    List,
    Stats,
    Export,
    Formats,
    Toggle(u32),
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, GrabError> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(GrabError::Parse("empty command".into()));
        };

        let id_arg = |arg: Option<&str>| -> Result<u32, GrabError> {
            let arg = arg.ok_or_else(|| GrabError::Parse(format!("'{}' needs an id", head)))?;
            Ok(arg.parse::<u32>()?)
        };

        let command = match head.to_lowercase().as_str() {
            "add" | "download" => {
                let url = parts
                    .next()
                    .ok_or_else(GrabError::url_required)?
                    .to_string();
                let format = parts
                    .next()
                    .map(str::parse::<VideoFormat>)
                    .transpose()?
                    .unwrap_or_default();
                let quality = parts
                    .next()
                    .map(str::parse::<Quality>)
                    .transpose()?
                    .unwrap_or_default();
                Command::Add {
                    url,
                    format,
                    quality,
                }
            }
            "pause" => Command::Pause(id_arg(parts.next())?),
            "resume" => Command::Resume(id_arg(parts.next())?),
            "remove" | "rm" | "delete" => Command::Remove(id_arg(parts.next())?),
            "list" | "ls" => Command::List,
            "stats" => Command::Stats,
            "export" | "json" => Command::Export,
            "formats" => Command::Formats,
            "toggle" => Command::Toggle(id_arg(parts.next())?),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(GrabError::Parse(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}

/// Line-oriented stand-in for the dashboard, download form and format screens.
pub struct InteractiveMode {
    manager: Arc<DownloadManager>,
}

impl InteractiveMode {
    pub fn new(manager: Arc<DownloadManager>) -> Self {
        Self { manager }
    }

    /// Reads commands from stdin until `quit` or end of input.
    pub async fn run(&mut self) {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match Command::parse(line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command).await,
                        Err(e) => println!("{} (type 'help')", e),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    }

    pub async fn execute(&self, command: Command) {
        match command {
            Command::Add {
                url,
                format,
                quality,
            } => match self.manager.submit_url(url, format, quality).await {
                Ok(entry) => println!("Started #{} {}", entry.id, entry.title),
                Err(e) => println!("{}", e),
            },
            Command::Pause(id) => {
                if let Err(e) = self.manager.pause(id).await {
                    warn!("Pause failed: {}", e);
                    println!("{}", e);
                }
            }
            Command::Resume(id) => {
                if let Err(e) = self.manager.resume(id).await {
                    warn!("Resume failed: {}", e);
                    println!("{}", e);
                }
            }
            Command::Remove(id) => {
                if self.manager.remove(id).await.is_none() {
                    println!("Nothing to remove for #{}", id);
                }
            }
            Command::List => self.print_dashboard().await,
            Command::Stats => println!("{}", self.manager.summary().await),
            Command::Export => {
                let snapshot = DashboardSnapshot::new(self.manager.entries().await);
                match snapshot.to_json() {
                    Ok(json) => println!("{}", json),
                    Err(e) => error!("Export failed: {}", e),
                }
            }
            Command::Formats => self.print_formats().await,
            Command::Toggle(id) => match self.manager.toggle_format(id).await {
                Some(enabled) => println!(
                    "Format {} {}",
                    id,
                    if enabled { "enabled" } else { "disabled" }
                ),
                None => println!("No format with id {}", id),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn print_dashboard(&self) {
        println!("{}", self.manager.summary().await);
        for entry in self.manager.entries().await {
            println!(
                "#{:<3} {:<12} {:>3}% {:<5} {:<6} {:>9}  {}",
                entry.id,
                entry.status(),
                entry.progress(),
                entry.format,
                entry.quality,
                entry.size_label(),
                entry.title
            );
            if let Some(reason) = &entry.last_error {
                println!("      error: {}", reason);
            }
        }
    }

    async fn print_formats(&self) {
        for option in self.manager.formats().await {
            println!(
                "[{}] {} {:<5} {:<6} quality={:<9} size={:<6} {}",
                if option.enabled { "x" } else { " " },
                option.id,
                option.name,
                option.extension,
                option.quality_label,
                option.size_label,
                option.description
            );
        }
    }
}
