use clap::{crate_version, App, Arg, SubCommand};

use drone_pareto_router::generator;
use drone_pareto_router::graph::Graph;
use drone_pareto_router::instance::{self, ExperimentReport, InstanceFile};
use drone_pareto_router::solvers::evolutionary;
use drone_pareto_router::{error::InstanceError, experiment};

fn main() {
	env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));
	let matches = App::new("Drone Pareto Router")
		.version(crate_version!())
		.about("Pareto-optimal single-drone delivery routing over no-fly zones")
		.subcommand(
			SubCommand::with_name("generate")
				.about("Generate a random instance file")
				.arg(Arg::with_name("output").takes_value(true).required(true).index(1).help("Output instance JSON"))
				.arg(Arg::with_name("nodes").long("nodes").takes_value(true).default_value("20").help("Node count, including the hub"))
				.arg(Arg::with_name("polygons").long("polygons").takes_value(true).default_value("3").help("No-fly zone count"))
				.arg(Arg::with_name("map-size").long("map-size").takes_value(true).default_value("100").help("Square map side length"))
				.arg(Arg::with_name("seed").long("seed").takes_value(true).default_value("0").help("PRNG seed")),
		)
		.subcommand(
			SubCommand::with_name("solve")
				.about("Solve an instance with one or all solvers")
				.arg(Arg::with_name("instance").takes_value(true).required(true).index(1).help("Instance JSON"))
				.arg(Arg::with_name("output").takes_value(true).required(true).index(2).help("Output solution JSON"))
				.arg(Arg::with_name("algorithm").long("algorithm").takes_value(true).default_value("all").possible_values(&["exact", "heuristic", "meta", "all"]))
				.arg(Arg::with_name("max-nodes").long("max-nodes").takes_value(true).help("BnB node budget"))
				.arg(Arg::with_name("population").long("population").takes_value(true).default_value("100").help("NSGA-II population size"))
				.arg(Arg::with_name("generations").long("generations").takes_value(true).default_value("200").help("NSGA-II generation cap"))
				.arg(Arg::with_name("seed").long("seed").takes_value(true).default_value("0").help("NSGA-II PRNG seed")),
		)
		.subcommand(
			SubCommand::with_name("experiment")
				.about("Run all three solvers and tabulate a comparison report")
				.arg(Arg::with_name("instance").takes_value(true).required(true).index(1).help("Instance JSON"))
				.arg(Arg::with_name("output").takes_value(true).required(true).index(2).help("Output experiment report JSON"))
				.arg(Arg::with_name("max-nodes").long("max-nodes").takes_value(true).help("BnB node budget")),
		)
		.get_matches();

	let result = if let Some(matches) = matches.subcommand_matches("generate") {
		run_generate(matches)
	} else if let Some(matches) = matches.subcommand_matches("solve") {
		run_solve(matches)
	} else if let Some(matches) = matches.subcommand_matches("experiment") {
		run_experiment(matches)
	} else {
		Ok(())
	};

	if let Err(e) = result {
		eprintln!("{}", e);
		std::process::exit(1);
	}
}

fn run_generate(matches: &clap::ArgMatches) -> Result<(), InstanceError> {
	let nodes: usize = matches.value_of("nodes").unwrap().parse().expect("--nodes must be an integer");
	let polygons: usize = matches.value_of("polygons").unwrap().parse().expect("--polygons must be an integer");
	let map_size: f64 = matches.value_of("map-size").unwrap().parse().expect("--map-size must be a number");
	let seed: u64 = matches.value_of("seed").unwrap().parse().expect("--seed must be an integer");

	log::info!("generating instance: nodes={} polygons={} map_size={} seed={}", nodes, polygons, map_size, seed);
	let instance = generator::generate(nodes, polygons, map_size, seed);
	instance.save(matches.value_of("output").unwrap())?;
	log::info!("wrote instance to {}", matches.value_of("output").unwrap());
	Ok(())
}

fn run_solve(matches: &clap::ArgMatches) -> Result<(), InstanceError> {
	let instance = InstanceFile::load(matches.value_of("instance").unwrap())?;
	let graph = Graph::from_instance(&instance);

	let max_nodes: Option<u64> = matches.value_of("max-nodes").map(|v| v.parse().expect("--max-nodes must be an integer"));
	let evo_params = evolutionary::Params {
		population: matches.value_of("population").unwrap().parse().expect("--population must be an integer"),
		generations: matches.value_of("generations").unwrap().parse().expect("--generations must be an integer"),
		seed: matches.value_of("seed").unwrap().parse().expect("--seed must be an integer"),
		..evolutionary::Params::default()
	};

	let mut report: ExperimentReport = ExperimentReport::new();
	match matches.value_of("algorithm").unwrap() {
		"exact" => {
			report.insert("exact".to_string(), experiment::run_exact(&graph, max_nodes));
		}
		"heuristic" => {
			report.insert("heuristic".to_string(), experiment::run_heuristic(&graph));
		}
		"meta" => {
			report.insert("meta".to_string(), experiment::run_evolutionary(&graph, evo_params));
		}
		_ => {
			report = experiment::run_all(&graph, max_nodes, evo_params);
		}
	}

	instance::write_report(matches.value_of("output").unwrap(), &report)?;
	log::info!("wrote solution to {}", matches.value_of("output").unwrap());
	Ok(())
}

fn run_experiment(matches: &clap::ArgMatches) -> Result<(), InstanceError> {
	let instance = InstanceFile::load(matches.value_of("instance").unwrap())?;
	let graph = Graph::from_instance(&instance);
	let max_nodes: Option<u64> = matches.value_of("max-nodes").map(|v| v.parse().expect("--max-nodes must be an integer"));

	let report = experiment::run_all(&graph, max_nodes, evolutionary::Params::default());
	instance::write_report(matches.value_of("output").unwrap(), &report)?;
	log::info!("wrote experiment report to {}", matches.value_of("output").unwrap());
	Ok(())
}
