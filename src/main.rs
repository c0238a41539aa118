fn main() {
    if let Err(err) = app_market_profiler::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
