//! Command-line entry point: schema document in, binding files out.

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, ValueEnum};
use schemabind_core::{generate, SchemaDocument, Target};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "schemabind",
    version,
    about = "Generate data models, validators, and marshalling code from a business-event schema document"
)]
struct Cli {
    /// Path to the schema document (YAML or JSON).
    #[arg(long)]
    schema: PathBuf,

    /// Output directory; artifacts land in per-language subdirectories.
    #[arg(long, default_value = "generated")]
    out: PathBuf,

    /// Language to generate bindings for.
    #[arg(long, value_enum, default_value_t = Language::All)]
    language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Language {
    Python,
    Typescript,
    All,
}

impl Language {
    fn targets(self) -> Vec<Target> {
        match self {
            Language::Python => vec![Target::Python],
            Language::Typescript => vec![Target::TypeScript],
            Language::All => Target::all().to_vec(),
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schemabind=info,schemabind_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let doc = SchemaDocument::load(&cli.schema)?;
    for target in cli.language.targets() {
        let artifacts = generate(&doc, target)?;
        let dir = cli.out.join(target.name());
        fs::create_dir_all(&dir)?;
        for artifact in &artifacts {
            fs::write(dir.join(&artifact.filename), &artifact.contents)?;
        }
        info!(
            language = target.name(),
            files = artifacts.len(),
            dir = %dir.display(),
            "bindings written"
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SCHEMA: &str = r##"
components:
  schemas:
    Bill:
      type: object
      required: [id]
      properties:
        id:
          type: string
          format: uuid
"##;

    #[test]
    fn run_writes_both_language_trees() {
        let tmp = tempfile::tempdir().unwrap();
        let schema_path = tmp.path().join("bill-event.yaml");
        fs::write(&schema_path, SCHEMA).unwrap();

        let cli = Cli {
            schema: schema_path,
            out: tmp.path().join("generated"),
            language: Language::All,
        };
        run(&cli).unwrap();

        for (dir, ext) in [("python", "py"), ("typescript", "ts")] {
            for stem in ["models", "validator", "marshaller", "unmarshaller", "common"] {
                let path = tmp
                    .path()
                    .join("generated")
                    .join(dir)
                    .join(format!("{stem}.{ext}"));
                assert!(path.is_file(), "missing {}", path.display());
            }
        }
    }

    #[test]
    fn run_reports_missing_schema_files() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            schema: tmp.path().join("absent.yaml"),
            out: tmp.path().join("generated"),
            language: Language::Python,
        };
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn single_language_writes_only_that_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let schema_path = tmp.path().join("bill-event.yaml");
        fs::write(&schema_path, SCHEMA).unwrap();

        let cli = Cli {
            schema: schema_path,
            out: tmp.path().join("generated"),
            language: Language::Typescript,
        };
        run(&cli).unwrap();

        assert!(tmp.path().join("generated/typescript/models.ts").is_file());
        assert!(!tmp.path().join("generated/python").exists());
    }
}
