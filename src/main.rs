fn main() {
    if let Err(err) = revgate::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
