//! Generates the `Problem` enumeration from `resources/problem-codes.csv`.
//!
//! Each CSV row becomes one enum variant with a stable user-facing code and
//! a constant message. Keeping the definitions in data keeps the codes
//! stable between releases and the documentation in sync.

use std::env;
use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// One row of the problem-codes file.
struct ProblemDef {
    /// Stable user-facing code. Must not change between releases.
    code: String,
    /// Variant name in the generated enumeration.
    name: String,
    /// Constant description of the problem category.
    message: String,
}

fn read_defs(path: &Path) -> Result<Vec<ProblemDef>, Box<dyn Error>> {
    let mut defs = Vec::new();
    let mut reader = csv::Reader::from_path(path)?;
    for record in reader.records() {
        let record = record?;
        let field = |index: usize| -> Result<String, String> {
            record
                .get(index)
                .map(String::from)
                .ok_or_else(|| format!("record {:?} is missing column {}", record, index))
        };
        defs.push(ProblemDef {
            code: field(0)?,
            name: field(1)?,
            message: field(2)?,
        });
    }
    Ok(defs)
}

fn render(defs: &[ProblemDef]) -> String {
    let mut out = String::new();

    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
    out.push_str("pub enum Problem {\n");
    for def in defs {
        let _ = writeln!(out, "    /// {}: {}", def.code, def.message);
        let _ = writeln!(out, "    {},", def.name);
    }
    out.push_str("}\n");

    out.push_str("\nimpl Problem {\n");
    out.push_str("    /// The stable user-facing code for the problem.\n");
    out.push_str("    pub fn code(&self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for def in defs {
        let _ = writeln!(out, "            Problem::{} => \"{}\",", def.name, def.code);
    }
    out.push_str("        }\n");
    out.push_str("    }\n");

    out.push_str("\n    /// The message describing the problem category. The message is\n");
    out.push_str("    /// constant and does not depend on the particular instance.\n");
    out.push_str("    pub fn message(&self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for def in defs {
        let _ = writeln!(out, "            Problem::{} => \"{}\",", def.name, def.message);
    }
    out.push_str("        }\n");
    out.push_str("    }\n");
    out.push_str("}\n");

    out
}

fn generate() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let src = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join("problem-codes.csv");
    let defs = read_defs(&src)?;

    let out = PathBuf::from(env::var("OUT_DIR")?).join("problems.rs");
    fs::write(out, render(&defs))?;
    Ok(())
}

fn main() {
    if let Err(err) = generate() {
        println!("cargo:warning=problem code generation failed: {}", err);
        process::exit(1);
    }
}
