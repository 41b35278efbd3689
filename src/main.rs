use clap::{Parser, Subcommand};
use mge::{Container, HeaderValue, Mode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mge", about = "The .mge header container CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the headers in a container
    List { input: PathBuf },
    /// Print every value in one header
    Get {
        input: PathBuf,
        name: String,
        /// Value kind: text (default), u64, i64, f64
        #[arg(short, long, default_value = "text")]
        kind: String,
    },
    /// Write a small sample container and read it back
    Demo {
        #[arg(short, long, default_value = "config")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input } => {
            let container = Container::open(&input, Mode::Read)?;
            println!("Container: {}", container.path().display());
            println!("{:<26} {:>12} {:>12}", "Name", "Size", "Offset");
            for entry in container.headers() {
                println!(
                    "{:<26} {:>12} {:>12}",
                    entry.name, entry.data_size, entry.data_offset
                );
            }
        }

        // ── Get ──────────────────────────────────────────────────────────────
        Commands::Get { input, name, kind } => {
            let container = Container::open(&input, Mode::Read)?;
            match kind.as_str() {
                "text" => print_header::<String>(&container, &name)?,
                "u64" => print_header::<u64>(&container, &name)?,
                "i64" => print_header::<i64>(&container, &name)?,
                "f64" => print_header::<f64>(&container, &name)?,
                other => return Err(mge::Error::UnsupportedType(other.to_owned()).into()),
            }
        }

        // ── Demo ─────────────────────────────────────────────────────────────
        Commands::Demo { output } => {
            let mut store = Container::open(&output, Mode::Write)?;
            store.additem("item1", &19.35f64)?;
            store.additem("item str", &String::from("some str"))?;

            let mut list = store.addheader::<String>("list")?;
            list.write(&"str1".to_owned())?;
            list.write(&"str2".to_owned())?;
            list.write(&"something".to_owned())?;
            list.finalize()?;
            drop(list);
            store.close();

            let store = Container::open(&output, Mode::Read)?;
            println!("{}", store.read_static::<f64>("item1")?);
            println!("{}", store.read_static::<String>("item str")?);
            for value in store.header::<String>("list")? {
                println!("{}", value?);
            }
            println!("Created: {}", store.path().display());
        }
    }

    Ok(())
}

fn print_header<T: HeaderValue + std::fmt::Display>(
    container: &Container,
    name: &str,
) -> mge::Result<()> {
    for value in container.header::<T>(name)? {
        println!("{}", value?);
    }
    Ok(())
}
