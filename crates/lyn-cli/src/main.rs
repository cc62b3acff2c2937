mod cli;
mod driver;

#[cfg(test)]
mod driver_tests;

use cli::{RunParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();
    let params = RunParams::from_matches(&matches);
    std::process::exit(driver::run(&params));
}
