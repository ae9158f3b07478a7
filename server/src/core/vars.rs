//! Worker variable checks and `.env` template generation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::config::Environment;
use super::constants::{
    DEFAULT_AUTH_API_URL, ENV_API_ENV, ENV_API_TOKEN, ENV_AUTH_API_URL, ENV_JWT_SECRET,
    MIN_JWT_SECRET_BYTES,
};

/// A variable the gateway reads from its environment
struct WorkerVar {
    name: &'static str,
    description: &'static str,
    secret: bool,
    required_in_production: bool,
    example: &'static str,
}

const WORKER_VARS: &[WorkerVar] = &[
    WorkerVar {
        name: ENV_AUTH_API_URL,
        description: "Identity provider base URL",
        secret: false,
        required_in_production: false,
        example: DEFAULT_AUTH_API_URL,
    },
    WorkerVar {
        name: ENV_API_ENV,
        description: "Deployment environment (development, staging, production)",
        secret: false,
        required_in_production: false,
        example: "development",
    },
    WorkerVar {
        name: ENV_API_TOKEN,
        description: "Client credential sent to the provider token endpoint",
        secret: true,
        required_in_production: true,
        example: "",
    },
    WorkerVar {
        name: ENV_JWT_SECRET,
        description: "OAuth state signing key (at least 32 bytes in production)",
        secret: true,
        required_in_production: true,
        example: "",
    },
];

#[derive(Debug, PartialEq, Eq)]
enum VarState {
    Set(String),
    Missing,
    MissingRequired,
    TooShort,
}

/// Print the status of every worker variable; fails when a required one is missing
pub fn check(environment: Environment) -> Result<()> {
    let report = inspect(environment, |name| std::env::var(name).ok());

    println!("Worker variables ({})", environment);
    let mut failures = 0;
    for (var, state) in &report {
        let status = match state {
            VarState::Set(shown) => format!("\x1b[32mset\x1b[0m      {}", shown),
            VarState::Missing => "\x1b[90mnot set\x1b[0m".to_string(),
            VarState::MissingRequired => {
                failures += 1;
                "\x1b[31mmissing (required)\x1b[0m".to_string()
            }
            VarState::TooShort => {
                failures += 1;
                format!(
                    "\x1b[31mtoo short (min {} bytes)\x1b[0m",
                    MIN_JWT_SECRET_BYTES
                )
            }
        };
        println!("  {:<14} {}", var.name, status);
    }

    if failures > 0 {
        anyhow::bail!(
            "{} worker variable(s) need attention for {}",
            failures,
            environment
        );
    }
    Ok(())
}

fn inspect(
    environment: Environment,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<(&'static WorkerVar, VarState)> {
    WORKER_VARS
        .iter()
        .map(|var| {
            let value = lookup(var.name).filter(|v| !v.is_empty());
            let state = match value {
                Some(v)
                    if var.name == ENV_JWT_SECRET
                        && environment.is_production()
                        && v.len() < MIN_JWT_SECRET_BYTES =>
                {
                    VarState::TooShort
                }
                Some(v) if var.secret => VarState::Set(mask(&v)),
                Some(v) => VarState::Set(v),
                None if var.required_in_production && environment.is_production() => {
                    VarState::MissingRequired
                }
                None => VarState::Missing,
            };
            (var, state)
        })
        .collect()
}

/// Show at most the first four characters of a secret
fn mask(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    if value.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", prefix)
    }
}

/// `.env` template listing every worker variable
pub fn template() -> String {
    let mut out = String::from("# Kush gateway worker variables\n");
    for var in WORKER_VARS {
        out.push_str(&format!("\n# {}\n{}={}\n", var.description, var.name, var.example));
    }
    out
}

/// Write the template to `output`, or stdout when no path is given
pub fn write_template(output: Option<&Path>, force: bool) -> Result<()> {
    let content = template();
    match output {
        None => {
            print!("{}", content);
            Ok(())
        }
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}
