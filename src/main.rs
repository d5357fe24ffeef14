use clap::Parser;
use event_streams_producer::config::FileConfig;
use event_streams_producer::{ProducerHandle, ProducerSettings, Result};
use rdkafka::util::get_rdkafka_version;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "es-produce")]
#[command(about = "Publish string messages to a SASL_SSL Kafka topic", long_about = None)]
struct Args {
    /// Bootstrap server list, e.g. broker-0:9093,broker-1:9093
    #[arg(short, long)]
    broker: Option<String>,

    /// Destination topic
    #[arg(short, long)]
    topic: Option<String>,

    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,

    /// Messages to publish; reads one message per stdin line when omitted
    messages: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    let (_, version) = get_rdkafka_version();
    info!(librdkafka = %version, "Starting es-produce");

    let file_config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            FileConfig::from_file(path).map_err(|e| {
                error!("Failed to load configuration: {}", e);
                e
            })?
        }
        None => FileConfig::default(),
    };

    let brokers = args
        .broker
        .or(file_config.kafka.brokers)
        .unwrap_or_default();
    let topic = args.topic.or(file_config.kafka.topic).unwrap_or_default();

    let settings =
        ProducerSettings::from_env(&brokers, &topic)?.with_profile(file_config.kafka.profile);
    let handle: ProducerHandle = ProducerHandle::from_settings(settings)?;

    let outcome = if args.messages.is_empty() {
        publish_stdin(&handle).await
    } else {
        publish_all(&handle, &args.messages).await
    };

    handle.shutdown();

    if let Err(e) = &outcome {
        error!("Publishing stopped: {}", e);
    }
    outcome
}

async fn publish_all(handle: &ProducerHandle, messages: &[String]) -> Result<()> {
    for message in messages {
        publish_one(handle, message).await?;
    }
    Ok(())
}

async fn publish_stdin(handle: &ProducerHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        publish_one(handle, &line).await?;
    }
    Ok(())
}

async fn publish_one(handle: &ProducerHandle, message: &str) -> Result<()> {
    let placement = handle.produce(message).await?;
    let line = serde_json::to_string(&placement).map_err(std::io::Error::from)?;
    println!("{}", line);
    Ok(())
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("event_streams_producer=debug,es_produce=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("event_streams_producer=info,es_produce=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
