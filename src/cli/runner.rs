//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FeedConfig;
use crate::continuation::FeedContinuation;
use crate::error::{Result, ResultExt};
use crate::range::{PartitionKeyRange, Range};
use crate::routing::{parse_ranges, InMemoryRoutingSource, PartitionKeyRangeCache, RoutingMap};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its result
    pub async fn run(&self) -> Result<()> {
        let message = self.execute().await?;
        self.output_message(&message);
        Ok(())
    }

    /// Run the CLI command and return its result
    pub async fn execute(&self) -> Result<Value> {
        match &self.cli.command {
            Commands::Inspect { continuation } => self.inspect(continuation),
            Commands::Overlap {
                routing,
                min,
                max,
                min_exclusive,
                max_inclusive,
            } => {
                let range = Range::new(min.clone(), max.clone(), !*min_exclusive, *max_inclusive);
                self.overlap(routing, &range)
            }
            Commands::Split {
                routing,
                continuation,
            } => self.split(routing, continuation).await,
            Commands::Validate { config } => self.validate(config),
        }
    }

    /// Decode a continuation
    fn inspect(&self, input: &str) -> Result<Value> {
        let continuation = load_continuation(input)?;
        Ok(describe(&continuation))
    }

    /// List the partitions overlapping a range
    fn overlap(&self, routing: &Path, range: &Range<String>) -> Result<Value> {
        let map = RoutingMap::try_new(load_routing(routing)?)?;
        let ranges: Vec<Value> = map
            .overlapping_ranges(range)
            .into_iter()
            .map(describe_partition)
            .collect();

        Ok(json!({
            "type": "RANGES",
            "query": range.to_string(),
            "ranges": ranges
        }))
    }

    /// Resolve a split against a routing file
    async fn split(&self, routing: &Path, input: &str) -> Result<Value> {
        let mut continuation = load_continuation(input)?;
        let source =
            InMemoryRoutingSource::with_container(continuation.container_id(), load_routing(routing)?);
        let cache = PartitionKeyRangeCache::new(source);

        continuation.handle_split(&cache).await?;

        Ok(json!({
            "type": "CONTINUATION",
            "continuation": continuation.to_json()?,
            "frontier": describe(&continuation)
        }))
    }

    /// Validate a feed configuration file
    fn validate(&self, path: &Path) -> Result<Value> {
        let config = FeedConfig::from_file(path)?;

        Ok(json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Feed over '{}' is valid: {:?} of {}",
                    config.container_id, config.mode, config.range
                )
            }
        }))
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Read a continuation given inline or as `@path`
fn load_continuation(input: &str) -> Result<FeedContinuation> {
    match input.strip_prefix('@') {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read continuation file '{path}'"))?;
            FeedContinuation::parse(content.trim())
        }
        None => FeedContinuation::parse(input),
    }
}

/// Read a routing file
fn load_routing(path: &Path) -> Result<Vec<PartitionKeyRange>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read routing file '{}'", path.display()))?;
    parse_ranges(&content)
}

fn describe_partition(partition: &PartitionKeyRange) -> Value {
    json!({
        "id": partition.id,
        "min": partition.min_inclusive,
        "max": partition.max_exclusive
    })
}

fn describe(continuation: &FeedContinuation) -> Value {
    match continuation {
        FeedContinuation::Composite(frontier) => {
            let rotation: Vec<Value> = frontier
                .tokens()
                .map(|slot| {
                    json!({
                        "range": slot.range.to_string(),
                        "token": slot.token,
                        "done": frontier.done_ranges().contains(slot.range_id())
                    })
                })
                .collect();

            json!({
                "kind": "composite",
                "container_id": frontier.container_id(),
                "range": frontier.feed_range().to_string(),
                "current": frontier.current_token().range.to_string(),
                "continuation": frontier.continuation(),
                "rotation": rotation,
                "done": frontier.done_ranges(),
                "is_done": frontier.is_done()
            })
        }
        FeedContinuation::PartitionKeyRange(partition) => json!({
            "kind": "partition_key_range",
            "container_id": partition.container_id,
            "range_id": partition.range_id,
            "continuation": partition.token,
            "is_done": partition.done
        }),
    }
}
