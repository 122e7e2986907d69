//! `exception` command implementation.

use anyhow::Result;
use contracts::HostException;
use serde::Serialize;

use crate::cli::ExceptionArgs;

#[derive(Debug, Serialize)]
struct ExceptionEntry {
    code: u32,
    name: String,
}

/// Execute the `exception` command
pub fn run_exception(args: &ExceptionArgs) -> Result<()> {
    let entries = lookup(args);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{:>4}  {}", entry.code, entry.name);
    }
    Ok(())
}

fn lookup(args: &ExceptionArgs) -> Vec<ExceptionEntry> {
    if args.all {
        return HostException::all()
            .iter()
            .map(|exception| ExceptionEntry {
                code: exception.code(),
                name: exception.as_str().to_string(),
            })
            .collect();
    }

    args.code
        .map(|code| ExceptionEntry {
            code,
            name: HostException::describe(code),
        })
        .into_iter()
        .collect()
}
