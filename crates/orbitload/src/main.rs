mod cli;
mod inspect;
mod paths;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Run(args)) => run::run(args),
        Some(Command::Inspect(args)) => inspect::inspect(args),
        Some(Command::ConfigPath) => {
            let location = paths::ConfigLocation::resolve(None)?;
            println!("{}", location.path.display());
            Ok(())
        }
        None => run::run(cli.run),
    }
}
