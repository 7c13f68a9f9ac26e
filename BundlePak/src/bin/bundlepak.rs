fn main() -> anyhow::Result<()> {
    bundlepak::cli::run_cli()
}
