fn main() {
    pooplang::cli::run();
}
