fn main() {
    bb_cli::init_logging();
    std::process::exit(bb_cli::run_cli_from_args(std::env::args_os()));
}
