use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = themec::Cli::parse();
    themec::run(&cli)
}
