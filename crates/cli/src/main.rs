use clap::Parser;

use billpack_cli::Args;

fn main() -> anyhow::Result<()> {
    billpack_observability::init_pretty();

    let args = Args::parse();
    let report = billpack_cli::run(&args)?;
    println!("{}", billpack_cli::render_report(&args, &report)?);
    Ok(())
}
