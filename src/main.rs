fn main() {
    if let Err(e) = rpchat::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
