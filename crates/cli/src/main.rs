use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{EntityKey, FilmographyIndex, RelatedEntity, RelationQuery};
use distance::SearchLimits;
use relations::{IndexFetcher, RelationCache};
use server::{ActorDistanceGraph, DistanceOrchestrator};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// reel-links - how many shared movies separate two actors
#[derive(Parser)]
#[command(name = "reel-links")]
#[command(about = "Actor distance search over a filmography dataset", long_about = None)]
struct Cli {
    /// Path to the dataset directory (people.dat, titles.dat, credits.dat)
    #[arg(short, long, default_value = "data/sample", global = true)]
    data_dir: PathBuf,

    /// Cast members paired per movie during the search (unbounded if absent)
    #[arg(long, global = true, allow_negative_numbers = true)]
    actor_limit: Option<i64>,

    /// Movies paired per actor during the search (unbounded if absent)
    #[arg(long, global = true, allow_negative_numbers = true)]
    movie_limit: Option<i64>,

    /// Keep at most this many relation lists in the cache (unbounded if absent)
    #[arg(long, global = true)]
    cache_capacity: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance between two actors
    Distance {
        /// Start actor, as a path or a full URL
        #[arg(long, value_parser = parse_key)]
        start: EntityKey,

        /// End actor, as a path or a full URL
        #[arg(long, value_parser = parse_key)]
        end: EntityKey,

        /// Print the chain of actors that proves the distance
        #[arg(long)]
        explain: bool,
    },

    /// Show the movies an actor played in
    Actor {
        #[arg(long, value_parser = parse_key)]
        key: EntityKey,

        /// Stop after this many movies
        #[arg(long)]
        limit: Option<NonZeroUsize>,

        /// Sort by title instead of filmography order
        #[arg(long)]
        sort: bool,

        /// Print full URLs instead of paths
        #[arg(long)]
        absolute: bool,
    },

    /// Show the cast of a movie
    Cast {
        #[arg(long, value_parser = parse_key)]
        key: EntityKey,

        /// Stop after this many actors
        #[arg(long)]
        limit: Option<NonZeroUsize>,

        /// Sort by name instead of billing order
        #[arg(long)]
        sort: bool,

        /// Print full URLs instead of paths
        #[arg(long)]
        absolute: bool,
    },

    /// Search for people by name
    Search {
        /// Name to search for (case-insensitive substring match)
        #[arg(long)]
        name: String,
    },

    /// Pairwise distances between a list of actors
    Graph {
        /// Comma-separated actor keys
        #[arg(long, value_delimiter = ',', value_parser = parse_key, required = true)]
        actors: Vec<EntityKey>,

        /// Only show edges of this distance
        #[arg(long)]
        distance: Option<u32>,

        /// Print the graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of random actor pairs to query
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

fn parse_key(input: &str) -> Result<EntityKey, String> {
    EntityKey::parse(input).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Reject bad limits before touching the dataset
    let limits = SearchLimits::try_new(cli.actor_limit, cli.movie_limit)?;
    debug!(?limits, "Search limits");

    println!("Loading dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        FilmographyIndex::load_from_files(&cli.data_dir)
            .with_context(|| format!("Failed to load dataset from {}", cli.data_dir.display()))?,
    );
    let (people, titles, credits) = index.counts();
    println!(
        "{} Loaded {} people, {} titles, {} credits in {:?}",
        "✓".green(),
        people,
        titles,
        credits,
        start.elapsed()
    );

    let fetcher = IndexFetcher::new(Arc::clone(&index));
    let cache = match cli.cache_capacity {
        Some(capacity) => RelationCache::with_capacity(fetcher, capacity),
        None => RelationCache::new(fetcher),
    };
    let orchestrator = DistanceOrchestrator::new(Arc::new(cache)).with_limits(limits);

    match cli.command {
        Commands::Distance {
            start,
            end,
            explain,
        } => handle_distance(&index, &orchestrator, start, end, explain).await?,
        Commands::Actor {
            key,
            limit,
            sort,
            absolute,
        } => {
            let movies = index
                .movies_by_actor(&key, &relation_query(limit, sort))
                .ok_or_else(|| anyhow!("Actor {} not found", key))?;
            let header = format!("Movies of {}:", display_name(&index, &key));
            print_relations(&header, &movies, absolute)?;
        }
        Commands::Cast {
            key,
            limit,
            sort,
            absolute,
        } => {
            let cast = index
                .actors_by_movie(&key, &relation_query(limit, sort))
                .ok_or_else(|| anyhow!("Movie {} not found", key))?;
            let header = format!("Cast of {}:", display_name(&index, &key));
            print_relations(&header, &cast, absolute)?;
        }
        Commands::Search { name } => handle_search(&index, &name),
        Commands::Graph {
            actors,
            distance,
            json,
        } => handle_graph(&index, &orchestrator, actors, distance, json).await?,
        Commands::Benchmark { requests } => {
            handle_benchmark(&index, &orchestrator, requests).await?
        }
    }

    Ok(())
}

/// Handle the 'distance' command
async fn handle_distance(
    index: &FilmographyIndex,
    orchestrator: &DistanceOrchestrator<IndexFetcher>,
    start: EntityKey,
    end: EntityKey,
    explain: bool,
) -> Result<()> {
    let trace = orchestrator.distance(start.clone(), end.clone()).await?;

    println!(
        "{} {} {} {}: {}",
        "Distance".bold().blue(),
        display_name(index, &start),
        "->".dimmed(),
        display_name(index, &end),
        trace.distance.to_string().green().bold()
    );

    if explain {
        match trace.witness(&start, &end) {
            Some(chain) => {
                let names: Vec<String> = chain.iter().map(|key| display_name(index, key)).collect();
                println!("   Chain: {}", names.join(" -> "));
            }
            None => println!("   No chain found within the explored depth"),
        }
        println!(
            "   Explored {} actors, {} links",
            trace.graph.node_count(),
            trace.graph.edge_count()
        );
        let stats = orchestrator.cache_stats();
        println!(
            "   Cache: {} hits, {} fetches",
            stats.hits, stats.fetches
        );
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(index: &FilmographyIndex, name: &str) {
    let matches = index.search_people(name);

    println!("{}", format!("Search results for '{}':", name).bold().blue());
    if matches.is_empty() {
        println!("   No people found");
    }
    for person in matches.iter().take(20) {
        println!("{}  {}", person.key.as_str().dimmed(), person.name);
    }
    if matches.len() > 20 {
        println!("   ... and {} more", matches.len() - 20);
    }
}

/// Handle the 'graph' command
async fn handle_graph(
    index: &FilmographyIndex,
    orchestrator: &DistanceOrchestrator<IndexFetcher>,
    actors: Vec<EntityKey>,
    distance: Option<u32>,
    json: bool,
) -> Result<()> {
    let graph = orchestrator.pairwise_distances(actors).await?;

    if json {
        let filtered = ActorDistanceGraph {
            actors: graph.actors.clone(),
            edges: graph.edges_at(distance).into_iter().cloned().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&filtered)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Distance graph over {} actors:", graph.actors.len())
            .bold()
            .blue()
    );
    for edge in graph.edges_at(distance) {
        let label = if edge.exact {
            edge.distance.to_string().green()
        } else {
            format!("{}+", edge.distance).yellow()
        };
        println!(
            "  {} {} {}: {}",
            display_name(index, &edge.source),
            "<->".dimmed(),
            display_name(index, &edge.target),
            label
        );
    }

    println!("Histogram:");
    for (value, count) in graph.histogram() {
        println!("  distance {}: {} pairs", value, count);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: &FilmographyIndex,
    orchestrator: &DistanceOrchestrator<IndexFetcher>,
    requests: usize,
) -> Result<()> {
    let actors = index.person_keys();
    if actors.len() < 2 {
        bail!("Benchmark needs at least two people in the dataset");
    }
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }

    let pairs: Vec<(EntityKey, EntityKey)> = (0..requests)
        .map(|_| {
            let a = rand::random::<u64>() as usize % actors.len();
            let b = rand::random::<u64>() as usize % actors.len();
            (actors[a].clone(), actors[b].clone())
        })
        .collect();

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for (start, end) in pairs {
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start_time = Instant::now();
            orchestrator.distance(start, end).await?;
            Ok::<_, anyhow::Error>(start_time.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();
    let stats = orchestrator.cache_stats();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    println!(
        "Cache: {} hits, {} fetches, {} failures",
        stats.hits, stats.fetches, stats.failures
    );

    Ok(())
}

/// Value at fraction `p` of a sorted, non-empty slice
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = (sorted.len() as f64 * p) as usize;
    sorted[rank.min(sorted.len() - 1)]
}

fn relation_query(limit: Option<NonZeroUsize>, sort: bool) -> RelationQuery {
    RelationQuery {
        limit,
        sorted: sort,
    }
}

/// Person name, movie title, or the bare key if neither is known
fn display_name(index: &FilmographyIndex, key: &EntityKey) -> String {
    if let Some(person) = index.get_person(key) {
        person.name.clone()
    } else if let Some(title) = index.get_title(key) {
        title.title.clone()
    } else {
        key.to_string()
    }
}

fn print_relations(header: &str, related: &[RelatedEntity], absolute: bool) -> Result<()> {
    println!("{}", header.bold().blue());
    if related.is_empty() {
        println!("   (none)");
    }
    for (rank, entity) in related.iter().enumerate() {
        let location = if absolute {
            entity.key.absolute_url()?
        } else {
            entity.key.to_string()
        };
        println!(
            "{}. {} {}",
            (rank + 1).to_string().green(),
            entity.name,
            location.dimmed()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_accepts_negative_limits() {
        let cli = Cli::try_parse_from([
            "reel-links",
            "--movie-limit",
            "-1",
            "distance",
            "--start",
            "/name/nm1/",
            "--end",
            "https://www.imdb.com/name/nm2/?ref_=x",
        ])
        .unwrap();

        assert_eq!(cli.movie_limit, Some(-1));
        assert!(SearchLimits::try_new(cli.actor_limit, cli.movie_limit).is_err());
        match cli.command {
            Commands::Distance { start, end, .. } => {
                assert_eq!(start.as_str(), "/name/nm1/");
                assert_eq!(end.as_str(), "/name/nm2/");
            }
            _ => panic!("expected distance command"),
        }
    }

    #[test]
    fn test_graph_actor_list_is_comma_separated() {
        let cli = Cli::try_parse_from([
            "reel-links",
            "graph",
            "--actors",
            "/name/nm1/,/name/nm2/,/name/nm3/",
        ])
        .unwrap();

        match cli.command {
            Commands::Graph { actors, .. } => assert_eq!(actors.len(), 3),
            _ => panic!("expected graph command"),
        }
    }

    #[test]
    fn test_percentile_stays_in_bounds() {
        let timings: Vec<Duration> = (1..=10).map(Duration::from_millis).collect();
        assert_eq!(percentile(&timings, 0.50), Duration::from_millis(6));
        assert_eq!(percentile(&timings, 0.99), Duration::from_millis(10));
        assert_eq!(percentile(&timings[..1], 0.95), Duration::from_millis(1));
    }

    #[test]
    fn test_relation_query_without_limit_is_unbounded() {
        assert_eq!(relation_query(None, false), RelationQuery::all());

        let query = relation_query(NonZeroUsize::new(3), true);
        assert_eq!(query.limit, NonZeroUsize::new(3));
        assert!(query.sorted);
    }

    #[test]
    fn test_zero_relation_limit_is_rejected() {
        for command in ["actor", "cast"] {
            let parsed = Cli::try_parse_from([
                "reel-links",
                command,
                "--key",
                "/name/nm1/",
                "--limit",
                "0",
            ]);
            assert!(parsed.is_err(), "{command} accepted --limit 0");
        }

        let cli = Cli::try_parse_from(["reel-links", "cast", "--key", "/title/tt1/", "--limit", "2"])
            .unwrap();
        match cli.command {
            Commands::Cast { limit, .. } => assert_eq!(limit, NonZeroUsize::new(2)),
            _ => panic!("expected cast command"),
        }
    }
}
