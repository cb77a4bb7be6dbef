use json_path_finder::{Finder, ResultSet};
use serde_json::Value;

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// One `Match(data=..., path="...")` line per match.
    Matches,
    /// A JSON array of the matched values.
    Values,
    /// A JSON array of the canonical paths.
    Paths,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The jsonpath string.
    #[arg(short, long)]
    jsonpath: String,

    /// Read the JSON document from this file instead of stdin.
    #[arg(short, long)]
    file: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Output::Matches)]
    output: Output,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let json = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut json = String::new();
            io::stdin().read_to_string(&mut json)?;
            json
        }
    };
    log::debug!("read {} bytes of JSON input", json.len());

    let finder: Finder = json.parse()?;
    let result = finder.find(&args.jsonpath)?;
    println!("{}", render(&result, args.output, args.pretty)?);
    Ok(())
}

fn render(result: &ResultSet, output: Output, pretty: bool) -> Result<String, serde_json::Error> {
    let json = match output {
        Output::Matches => {
            return Ok(result
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Output::Values => Value::Array(result.to_values()),
        Output::Paths => Value::from(result.paths()),
    };
    if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod test {
    use json_path_finder::JsonPathQuery;
    use serde_json::json;

    use super::{render, Output};

    #[test]
    fn renders_each_output_mode() -> Result<(), Box<dyn std::error::Error>> {
        let json = json!({"a": [1, {"b": "x"}]});
        let result = json.find("$.a[*]")?;
        assert_eq!(
            "Match(data=1, path=\"$['a'][0]\")\nMatch(data={\"b\":\"x\"}, path=\"$['a'][1]\")",
            render(&result, Output::Matches, false)?
        );
        assert_eq!(r#"[1,{"b":"x"}]"#, render(&result, Output::Values, false)?);
        assert_eq!(r#"["$['a'][0]","$['a'][1]"]"#, render(&result, Output::Paths, false)?);
        assert_eq!("[\n  \"$['a'][0]\",\n  \"$['a'][1]\"\n]", render(&result, Output::Paths, true)?);
        Ok(())
    }
}
