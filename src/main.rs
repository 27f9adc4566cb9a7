fn main() {
    if let Err(error) = bioimg_planes::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
