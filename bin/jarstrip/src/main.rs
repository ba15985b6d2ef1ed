use jarstrip::strip;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

fn main() -> Result<(), strip::Error> {
    env_logger::init();

    let matches = Command::new("jarstrip")
        .version("0.1.0")
        .about("Strip the code from a jar file, keeping a compilable API-only surface")
        .arg(
            Arg::new("INPUT")
                .help("Input jar of compiled classes")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("Where to write the stripped jar")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("classpath")
                .long("classpath")
                .value_name("JAR")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Append)
                .help("Extra jar used to resolve supertype references (may repeat)"),
        )
        .arg(
            Arg::new("removeNonPublic")
                .long("removeNonPublic")
                .action(ArgAction::SetTrue)
                .help("Also drop fields and methods that are not public"),
        )
        .get_matches();

    let settings = strip::Settings {
        remove_non_public: matches.get_flag("removeNonPublic"),
        classpath: matches
            .get_many::<PathBuf>("classpath")
            .map(|jars| jars.cloned().collect())
            .unwrap_or_default(),
    };

    let input = matches.get_one::<PathBuf>("INPUT").unwrap();
    let output = matches.get_one::<PathBuf>("OUTPUT").unwrap();

    log::info!("Stripping '{}'", input.display());
    let summary = strip::strip_jar(input, output, &settings)?;

    println!(
        "Finished processing the input file ({} classes included, {} skipped).",
        summary.included, summary.skipped
    );
    Ok(())
}
