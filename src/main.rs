fn main() {
    if let Err(err) = grid_layout_rs::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
