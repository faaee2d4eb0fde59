/*!
## tgi (Temporal Graph Isomorphism)

A command-line utility for finding temporal patterns in graphs stored in a
SQLite database.

Query and data graphs are read from edge tables (`<table>` and
`<table>_labels`). Tables can be filled from graph files or with random
graphs before the search runs.

```text
tgi <database> <query_table> <data_table> [options]

  -t, --timer             log the duration of each phase
  -v, --verbose           log debug messages
  -r, --as-root           create the database if it does not exist
  -q, --make-query N      fill the query table with N random edges
  -d, --make-data N       fill the data table with N random edges
  -D, --density F         density of the random data graph
  -C, --force-clear       clear graph and pattern tables first
      --no-algo           only prepare the tables, do not search
      --seed N            seed for random graphs
  -k, --cliques K         record triangles and cliques of up to K vertices
  -b, --budget N          expand at most N search nodes
      --import-query FILE fill the query table from a graph file
      --import-data FILE  fill the data table from a graph file
```

### License

MIT
*/
use std::time::Instant;

use eyre::Result;
use temporal_isomorphism::{
    find,
    generate::{self, DEFAULT_DENSITY},
    graph::{self, Graph},
    pattern,
    store::SqliteStore,
    Budget, Config,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let args = cli::main()?;

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .init();

    let timer = args.timer;
    let total = Instant::now();

    // Nothing is generated or loaded unless the store is available.
    let mut store = measure(timer, "Open store", || {
        SqliteStore::open(&args.database, args.as_root)
    })?;
    store.begin()?;

    if args.force_clear {
        store.clear_graph(&args.query_table)?;
        store.clear_graph(&args.data_table)?;
        store.clear_patterns()?;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    if args.make_query.is_some() || args.make_data.is_some() {
        info!("Generating graphs with seed {}", seed);
    }

    if let Some(path) = &args.import_data {
        let data_graph = measure(timer, "Import data graph", || graph::parse(path))?;
        store.write_graph(&args.data_table, &data_graph)?;
    }
    if let Some(edge_count) = args.make_data {
        let density = args.density.unwrap_or(DEFAULT_DENSITY);
        let data_graph = measure(timer, "Generate data graph", || {
            generate::random_graph(edge_count, density, seed)
        });
        store.write_graph(&args.data_table, &data_graph)?;
    }

    if let Some(path) = &args.import_query {
        let query_graph = measure(timer, "Import query graph", || graph::parse(path))?;
        store.write_graph(&args.query_table, &query_graph)?;
    }
    if let Some(edge_count) = args.make_query {
        let query_graph = measure(timer, "Generate query graph", || {
            generate::random_graph(edge_count, DEFAULT_DENSITY, seed.wrapping_add(1))
        });
        store.write_graph(&args.query_table, &query_graph)?;
    }

    println!("------");
    let query_graph = measure(timer, "Load query graph", || {
        store.snapshot(&args.query_table)
    })?;
    let data_graph = measure(timer, "Load data graph", || store.snapshot(&args.data_table))?;

    println!("Query Graph Meta Information:\n{}", query_graph);
    println!("Data Graph Meta Information:\n{}", data_graph);
    println!("------");

    if !args.no_algo {
        search(&args, &query_graph, &data_graph);

        if let Some(max_clique_size) = args.cliques {
            let profile = measure(timer, "Enumerate patterns", || {
                pattern::profile(&data_graph, max_clique_size, &mut store)
            })?;
            println!(
                "Triangles = {} ({} new)",
                profile.triangles, profile.new_triangles
            );
            println!("Cliques = {} ({} new)", profile.cliques, profile.new_cliques);
            println!("------");
        }
    }

    store.commit()?;

    println!("Total runtime = {:?}", total.elapsed());

    Ok(())
}

fn search(args: &cli::AppArgs, query_graph: &Graph, data_graph: &Graph) {
    let config = match args.budget {
        Some(nodes) => Config::default().with_budget(Budget::Nodes(nodes)),
        None => Config::default(),
    };

    let outcome = measure(args.timer, "Search", || {
        find(data_graph, query_graph, &config)
    });
    println!("Search result = {}", outcome);
    println!("------");
}

fn measure<R>(enabled: bool, desc: &str, func: impl FnOnce() -> R) -> R {
    if enabled {
        info!("Start :: {}", desc);
    }
    let start = Instant::now();
    let result = func();
    if enabled {
        info!("Finish :: {} took {:?}", desc, start.elapsed());
    }
    result
}

mod cli {
    use pico_args::Arguments;
    use std::{ffi::OsStr, path::PathBuf};

    use crate::Result;

    #[derive(Debug)]
    pub(crate) struct AppArgs {
        pub(crate) database: PathBuf,
        pub(crate) query_table: String,
        pub(crate) data_table: String,
        pub(crate) timer: bool,
        pub(crate) verbose: bool,
        pub(crate) as_root: bool,
        pub(crate) make_query: Option<usize>,
        pub(crate) make_data: Option<usize>,
        pub(crate) density: Option<f64>,
        pub(crate) force_clear: bool,
        pub(crate) no_algo: bool,
        pub(crate) seed: Option<u64>,
        pub(crate) cliques: Option<usize>,
        pub(crate) budget: Option<u64>,
        pub(crate) import_query: Option<PathBuf>,
        pub(crate) import_data: Option<PathBuf>,
    }

    pub(crate) fn main() -> Result<AppArgs> {
        let mut pargs = Arguments::from_env();

        fn as_path_buf(arg: &OsStr) -> Result<PathBuf> {
            Ok(arg.into())
        }

        // Options first, the remaining arguments are positional.
        let timer = pargs.contains(["-t", "--timer"]);
        let verbose = pargs.contains(["-v", "--verbose"]);
        let as_root = pargs.contains(["-r", "--as-root"]);
        let make_query = pargs.opt_value_from_str(["-q", "--make-query"])?;
        let make_data = pargs.opt_value_from_str(["-d", "--make-data"])?;
        let density = pargs.opt_value_from_str(["-D", "--density"])?;
        let force_clear = pargs.contains(["-C", "--force-clear"]);
        let no_algo = pargs.contains("--no-algo");
        let seed = pargs.opt_value_from_str("--seed")?;
        let cliques = pargs.opt_value_from_str(["-k", "--cliques"])?;
        let budget = pargs.opt_value_from_str(["-b", "--budget"])?;
        let import_query = pargs.opt_value_from_os_str("--import-query", as_path_buf)?;
        let import_data = pargs.opt_value_from_os_str("--import-data", as_path_buf)?;

        let args = AppArgs {
            database: pargs.free_from_os_str(as_path_buf)?,
            query_table: pargs.free_from_str()?,
            data_table: pargs.free_from_str()?,
            timer,
            verbose,
            as_root,
            make_query,
            make_data,
            density,
            force_clear,
            no_algo,
            seed,
            cliques,
            budget,
            import_query,
            import_data,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(eyre::eyre!("Unexpected arguments {:?}", remaining));
        }

        Ok(args)
    }
}
