mod cli;

fn main() {
    // Parse CLI, set up config and logging, run the pipeline.
    let code = cli::run_from_args();
    std::process::exit(code);
}
