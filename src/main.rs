use clap::{App, Arg};
use lc3vm::Config;
use std::process;

fn main() {
    let matches = App::new("LC-3 VM")
        .arg(
            Arg::with_name("IMAGE")
                .help("Object image(s) to load, in order.")
                .multiple(true)
                .index(1),
        )
        .get_matches();

    let image_paths = matches
        .values_of("IMAGE")
        .map(|values| values.map(String::from).collect())
        .unwrap_or_else(Vec::new);

    let exit_code = match Config::with(image_paths).and_then(lc3vm::run) {
        Ok(()) => 0,
        Err(e) => {
            println!("{}", e);
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
