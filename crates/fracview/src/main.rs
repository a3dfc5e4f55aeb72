mod cli;
mod run;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    if cli.list_formulas {
        run::list_formulas();
        return Ok(());
    }
    run::run(cli)
}
