use anyhow::Result;
use clap::Parser;
use ocm::{
    Error,
    cli::{Cli, Commands},
    commands,
    config::Paths,
    logging,
    storage::Storage,
};

fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    let code = match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err);
            if let Some(hint) = err.downcast_ref::<Error>().and_then(Error::hint) {
                eprintln!("hint: {}", hint);
            }
            1
        }
    };
    std::process::exit(code);
}

fn dispatch(cli: Cli) -> Result<i32> {
    let storage = Storage::new(Paths::from_env()?);
    storage.ensure_directories()?;

    match &cli.command {
        Some(Commands::List) => commands::list(&storage)?,
        Some(Commands::Current) => commands::current(&storage)?,
        Some(Commands::Create {
            name,
            description,
            empty,
        }) => commands::create(&storage, name, description.clone(), *empty)?,
        Some(Commands::Use { name }) => commands::use_profile(&storage, name)?,
        Some(Commands::Delete { name, force }) => commands::delete(&storage, name, *force)?,
        Some(Commands::Edit { name }) => commands::edit(&storage, name)?,
        Some(Commands::Run { name, args }) => return Ok(commands::run(&storage, name, args)?),
        Some(Commands::Copy { source, dest }) => commands::copy(&storage, source, dest)?,
        Some(Commands::Show { name }) => commands::show(&storage, name)?,
        Some(Commands::Rename { origin, new }) => commands::rename(&storage, origin, new)?,
        None => commands::status(&storage)?,
    }

    Ok(0)
}
