use anyhow::Result;

fn main() -> Result<()> {
    suidshim::cli::run()
}
