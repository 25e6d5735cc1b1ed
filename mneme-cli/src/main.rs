//! Mneme CLI - Command-line tools for the instrumented cache

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mneme_core::prelude::*;
use tracing::debug;

#[derive(Parser)]
#[command(name = "mneme")]
#[command(about = "Mneme instrumented cache CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to mneme.toml, MNEME_* variables and MNEME_CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a few values and print the recorded call trace
    Demo {
        /// Also write the trace as JSON lines to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Read commands from stdin against one in-process cache
    Session,
    /// Version information
    Version,
}

/// One line of session input
#[derive(Debug, PartialEq)]
enum SessionCommand {
    Store(StoredValue),
    Get { key: String, decoder: Decoder },
    Replay,
    Quit,
}

fn parse_command(line: &str) -> Result<SessionCommand> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match verb {
        "store" => Ok(SessionCommand::Store(StoredValue::from(rest))),
        "store-int" => {
            let n = rest.parse::<i64>().with_context(|| format!("not an integer: {}", rest))?;
            Ok(SessionCommand::Store(StoredValue::from(n)))
        }
        "store-float" => {
            let x = rest.parse::<f64>().with_context(|| format!("not a float: {}", rest))?;
            Ok(SessionCommand::Store(StoredValue::from(x)))
        }
        "get" => {
            let mut parts = rest.split_whitespace();
            let key = parts.next().context("usage: get <key> [raw|text|integer|float]")?;
            let decoder = match parts.next() {
                Some(name) => name.parse::<Decoder>()?,
                None => Decoder::Text,
            };
            Ok(SessionCommand::Get {
                key: key.to_string(),
                decoder,
            })
        }
        "replay" => Ok(SessionCommand::Replay),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => bail!("unknown command '{}'", other),
    }
}

async fn run_demo(cache: &Cache, save: Option<PathBuf>) -> Result<()> {
    let k1 = cache.store("foo").await?;
    println!("store(\"foo\") -> {}", k1);
    println!("retrieve_as_text -> {:?}", cache.retrieve_as_text(&k1).await?);

    let k2 = cache.store(123).await?;
    println!("store(123) -> {}", k2);
    println!("retrieve_as_integer -> {:?}", cache.retrieve_as_integer(&k2).await?);

    let trace = cache.replay().await?;
    println!();
    println!("{}", trace);

    if let Some(path) = save {
        trace
            .save(&path)
            .with_context(|| format!("failed to save trace to {}", path.display()))?;
        println!("Trace saved to {}", path.display());
    }

    Ok(())
}

async fn run_session(
    cache: &Cache,
    input: impl BufRead,
    out: &mut impl Write,
    errors: &mut impl Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(errors, "error: {}", err)?;
                continue;
            }
        };
        debug!(?command, "Session command");

        match command {
            SessionCommand::Store(value) => match cache.store(value).await {
                Ok(key) => writeln!(out, "{}", key)?,
                Err(err) => writeln!(errors, "error: {}", err)?,
            },
            SessionCommand::Get { key, decoder } => match cache.retrieve(&key, decoder).await {
                Ok(Some(value)) => writeln!(out, "{}", value)?,
                Ok(None) => writeln!(out, "(nil)")?,
                Err(err) => writeln!(errors, "error: {}", err)?,
            },
            SessionCommand::Replay => match cache.replay().await {
                Ok(trace) => writeln!(out, "{}", trace)?,
                Err(err) => writeln!(errors, "error: {}", err)?,
            },
            SessionCommand::Quit => break,
        }
        out.flush()?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MnemeConfig::from_file(path)?,
        None => MnemeConfig::load()?,
    };

    match cli.command {
        Commands::Version => {
            println!("mneme {}", env!("CARGO_PKG_VERSION"));
            println!("mneme-core {}", mneme_core::VERSION);
        }
        Commands::Demo { save } => {
            let cache = Cache::from_config(&config).await?;
            run_demo(&cache, save).await?;
        }
        Commands::Session => {
            let cache = Cache::from_config(&config).await?;
            run_session(
                &cache,
                std::io::stdin().lock(),
                &mut std::io::stdout(),
                &mut std::io::stderr(),
            )
            .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use async_trait::async_trait;

    /// Store whose counter reads fail, so replay errors while writes succeed
    struct UnreadableCounters {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for UnreadableCounters {
        async fn set(&self, key: &str, value: Vec<u8>) -> mneme_core::error::Result<()> {
            self.inner.set(key, value).await
        }

        async fn get(&self, key: &str) -> mneme_core::error::Result<Option<Vec<u8>>> {
            if key == STORE_OPERATION {
                return Err(MnemeError::StoreUnavailable("read timed out".to_string()));
            }
            self.inner.get(key).await
        }

        async fn incr(&self, key: &str) -> mneme_core::error::Result<i64> {
            self.inner.incr(key).await
        }

        async fn rpush(&self, key: &str, value: Vec<u8>) -> mneme_core::error::Result<u64> {
            self.inner.rpush(key, value).await
        }

        async fn lrange(&self, key: &str, start: i64, stop: i64) -> mneme_core::error::Result<Vec<Vec<u8>>> {
            self.inner.lrange(key, start, stop).await
        }

        async fn exists(&self, key: &str) -> mneme_core::error::Result<bool> {
            self.inner.exists(key).await
        }

        async fn delete(&self, key: &str) -> mneme_core::error::Result<bool> {
            self.inner.delete(key).await
        }

        async fn flush(&self) -> mneme_core::error::Result<()> {
            self.inner.flush().await
        }

        async fn health_check(&self) -> mneme_core::error::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_store_commands() {
        assert_eq!(
            parse_command("store hello world").unwrap(),
            SessionCommand::Store(StoredValue::from("hello world"))
        );
        assert_eq!(
            parse_command("store-int 42").unwrap(),
            SessionCommand::Store(StoredValue::from(42i64))
        );
        assert_eq!(
            parse_command("store-float 0.5").unwrap(),
            SessionCommand::Store(StoredValue::from(0.5))
        );
        assert!(parse_command("store-int forty").is_err());
    }

    #[test]
    fn test_parse_get() {
        assert_eq!(
            parse_command("get abc").unwrap(),
            SessionCommand::Get {
                key: "abc".to_string(),
                decoder: Decoder::Text
            }
        );
        assert_eq!(
            parse_command("get abc int").unwrap(),
            SessionCommand::Get {
                key: "abc".to_string(),
                decoder: Decoder::Integer
            }
        );
        assert!(parse_command("get").is_err());
        assert!(parse_command("get abc yaml").is_err());
    }

    #[test]
    fn test_parse_other() {
        assert_eq!(parse_command("replay").unwrap(), SessionCommand::Replay);
        assert_eq!(parse_command("  quit ").unwrap(), SessionCommand::Quit);
        assert!(parse_command("flush").is_err());
    }

    #[tokio::test]
    async fn test_demo_runs() {
        let cache = Cache::from_config(&MnemeConfig::default()).await.unwrap();
        run_demo(&cache, None).await.unwrap();

        let trace = cache.replay().await.unwrap();
        assert_eq!(trace.call_count, 2);
    }

    #[tokio::test]
    async fn test_session_runs_commands_until_quit() {
        let cache = Cache::from_config(&MnemeConfig::default()).await.unwrap();
        let input = Cursor::new("store foo\n\nget missing\nbogus\nquit\nstore ignored\n");
        let mut out = Vec::new();
        let mut errors = Vec::new();

        run_session(&cache, input, &mut out, &mut errors).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            cache.retrieve_as_text(lines[0]).await.unwrap(),
            Some("foo".to_string())
        );
        assert_eq!(lines[1], "(nil)");
        assert!(String::from_utf8(errors).unwrap().contains("unknown command 'bogus'"));
        assert_eq!(cache.replay().await.unwrap().call_count, 1);
    }

    #[tokio::test]
    async fn test_session_continues_after_replay_error() {
        let store = Arc::new(UnreadableCounters {
            inner: InMemoryStore::new(),
        });
        let cache = Cache::new(store).await.unwrap();
        let input = Cursor::new("replay\nstore bar\n");
        let mut out = Vec::new();
        let mut errors = Vec::new();

        run_session(&cache, input, &mut out, &mut errors).await.unwrap();

        let errors = String::from_utf8(errors).unwrap();
        assert!(errors.contains("Store unavailable: read timed out"));

        let out = String::from_utf8(out).unwrap();
        let key = out.trim();
        assert_eq!(cache.retrieve_as_text(key).await.unwrap(), Some("bar".to_string()));
    }
}
