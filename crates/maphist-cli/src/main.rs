fn main() -> anyhow::Result<()> {
    let matches = maphist_cli::cli().get_matches();
    maphist_cli::init_tracing(matches.get_flag("verbose"));

    let stdout = std::io::stdout();
    maphist_cli::run(&matches, &mut stdout.lock())
}
