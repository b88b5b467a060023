fn main() {
    if let Err(err) = levelgraph_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
