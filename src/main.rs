use std::path::PathBuf;

use clap::Parser;
use social_graph_simulator::{
    data::generator::NetworkGenerator,
    report::NetworkLogger,
    DirectoryStore, InterestCatalog, NetworkConfig, Result, SnapshotStore, SocialError,
    SocialNetwork, TraversalMode, UserHandle,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Simulates a small social network and ranks feeds and friend suggestions")]
struct Args {
    /// Number of users to generate when no stored network is found.
    #[clap(long, short, default_value_t = 50)]
    users: usize,
    #[clap(long, short, default_value_t = 42)]
    seed: u64,
    /// Interest catalog, one topic per line.
    #[clap(long, short)]
    interests: Option<PathBuf>,
    /// Directory the network is loaded from and saved to.
    #[clap(long, short)]
    database: Option<PathBuf>,
    /// User to show feed, suggestions and distances for. Defaults to the newest user.
    #[clap(long)]
    user: Option<String>,
    #[clap(long, short, default_value = "bfs")]
    traversal: TraversalMode,
    #[clap(long)]
    export_csv: Option<PathBuf>,
    #[clap(long, default_value_t = social_graph_simulator::config::DEFAULT_HEAP_CAPACITY)]
    heap_capacity: usize,
    /// Suggestions by interests only include users strictly closer than this.
    #[clap(long, default_value_t = 0.75)]
    max_distance: f64,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let catalog = match &args.interests {
        Some(path) => InterestCatalog::load(path)?,
        None => InterestCatalog::default_topics(),
    };
    let config = NetworkConfig {
        heap_capacity: args.heap_capacity,
        suggestion_max_distance: args.max_distance,
        ..NetworkConfig::default()
    };
    config.validate()?;

    let mut store = match &args.database {
        Some(path) => Some(DirectoryStore::open(path)?),
        None => None,
    };

    let mut network = match &store {
        Some(store) if !store.stored_usernames()?.is_empty() => {
            SocialNetwork::load(catalog, config, store)?
        }
        _ => NetworkGenerator::new(args.users, 0.25, 0.1, 3, args.seed).generate(catalog, config)?,
    };

    let focus = match &args.user {
        Some(name) => network
            .lookup_user(name)
            .ok_or_else(|| SocialError::NotFound(format!("user `{}`", name)))?,
        None => match network.graph().handle_at(0) {
            Some(handle) => handle,
            None => {
                info!("network is empty, nothing to show");
                return Ok(());
            }
        },
    };

    print_report(&mut network, focus, args.traversal)?;

    if let Some(store) = store.as_mut() {
        network.save(store)?;
    }

    if let Some(path) = &args.export_csv {
        network.refresh_profiles();
        let mut logger = NetworkLogger::new();
        logger.add_network(&network);
        logger.write_to_csv(path)?;
        info!(path = %path.display(), rows = logger.len(), "report written");
    }

    Ok(())
}

fn username(network: &SocialNetwork, handle: UserHandle) -> &str {
    network
        .user(handle)
        .map(|user| user.username.as_str())
        .unwrap_or("?")
}

fn print_report(network: &mut SocialNetwork, focus: UserHandle, mode: TraversalMode) -> Result<()> {
    println!("\n--- Feed of {} ---", username(network, focus));
    let feed = network.build_feed(focus)?;
    let dropped = feed.dropped();
    for item in feed {
        println!(
            "{:>8.3}  {} ({}): {}",
            item.priority,
            item.payload.author_name,
            item.payload.post.date.format("%Y-%m-%d %H:%M"),
            item.payload.post.content
        );
    }
    if dropped > 0 {
        println!("({} posts did not fit)", dropped);
    }
    let network: &SocialNetwork = network;

    println!("\n--- Suggested by interests ---");
    for item in network.build_interest_suggestions(focus)? {
        println!(
            "{:>8.3}  {} shares {}",
            item.priority,
            item.payload.username,
            item.payload.shared_interests.join(", ")
        );
    }

    println!("\n--- Suggested by graph distance ---");
    for item in network.build_graph_suggestions(focus)? {
        println!("{:>8.3}  {}", item.priority, item.payload.username);
    }

    println!("\n--- Traversal ({:?}) ---", mode);
    let order: Vec<&str> = network
        .traverse(focus, mode)?
        .into_iter()
        .map(|handle| username(network, handle))
        .collect();
    println!("{}", order.join(" -> "));

    println!("\n--- Shortest distances ---");
    let table = network.shortest_distances(focus)?;
    for (handle, distance) in table.iter() {
        match distance {
            Some(distance) => println!("{:>8.3}  {}", distance, username(network, handle)),
            None => println!("{:>8}  {}", "-", username(network, handle)),
        }
    }
    println!("-----------------------------------\n");

    Ok(())
}
