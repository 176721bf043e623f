use {
    anyhow::Result,
    clap::{value_parser, Arg, ArgAction, ArgGroup, Command},
    psdump::{
        config::{
            config,
            config::{Config, DEFAULT_CHUNK_SIZE},
        },
        service::Service,
    },
    std::env,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_levels = vec!["trace", "debug", "info", "warn", "error"];

    let mut cmd = Command::new("PSDUMP")
        .bin_name("psdump")
        .version("0.1.0")
        .about("Split an MPEG program stream into header diagnostics and elementary stream payloads.")
        .arg(
            Arg::new("config_file_path")
                .long("config")
                .short('c')
                .value_name("path")
                .help("Specify the psdump configuration file path.")
                .value_parser(value_parser!(String))
                .conflicts_with_all(["input", "output", "chunk", "max", "tables", "log"]),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .value_name("path")
                .help("Specify the program stream file to dump.")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("path")
                .help("Specify the directory the dumped files are written to.")
                .value_parser(value_parser!(String)),
        )
        .arg(
            Arg::new("chunk")
                .long("chunk")
                .value_name("bytes")
                .help("Specify how many bytes are fed to the demuxer per read.")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("max")
                .long("max")
                .short('m')
                .value_name("units")
                .help("Stop after this many units, 0 means no limit.")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("tables")
                .long("tables")
                .short('t')
                .help("Also write the PAT and PMT of the single program remux.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .short('l')
                .value_name("level")
                .help("Specify the log level.")
                .value_parser(log_levels),
        )
        .group(
            ArgGroup::new("source")
                .args(["config_file_path", "input"])
                .required(true),
        );

    let args: Vec<String> = env::args().collect();
    if 1 == args.len() {
        cmd.print_help()?;
        return Ok(());
    }

    let matches = cmd.clone().get_matches();

    let config = if let Some(path) = matches.get_one::<String>("config_file_path") {
        let config = config::load(path);
        match config {
            Ok(val) => val,
            Err(err) => {
                println!("{}: {}", path, err);
                return Ok(());
            }
        }
    } else {
        let input = match matches.get_one::<String>("input") {
            Some(val) => val.clone(),
            None => String::new(),
        };
        let chunk_size = match matches.get_one::<usize>("chunk") {
            Some(val) => *val,
            None => DEFAULT_CHUNK_SIZE,
        };
        let max_units = match matches.get_one::<usize>("max") {
            Some(val) => *val,
            None => 0,
        };
        let log_level = match matches.get_one::<String>("log") {
            Some(val) => val.clone(),
            None => String::from("info"),
        };
        let config = Config::new(
            input,
            matches.get_one::<String>("output").cloned(),
            chunk_size,
            max_units,
            matches.get_flag("tables"),
            log_level,
        );
        if let Err(err) = config.check() {
            println!("{}", err);
            return Ok(());
        }
        config
    };

    /*set log level*/
    if let Some(log_config_value) = &config.log {
        env::set_var("RUST_LOG", log_config_value.level.clone());
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut service = Service::new(config);
    let summary = service.run().await?;
    summary.print();

    if summary.stats.corrupt_units > 0 {
        log::warn!("{} corrupt units were dropped", summary.stats.corrupt_units);
    }

    Ok(())
}
