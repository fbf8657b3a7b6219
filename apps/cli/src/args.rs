// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line arguments.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "usage: dynmod <scene.json> [--run <operation>]... [--obj <model> <path>]...";

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Scene description to load
    pub scene: PathBuf,
    /// Operations to apply explicitly, in order
    pub run: Vec<String>,
    /// Models to export as OBJ: `(model name, path)`
    pub obj: Vec<(String, PathBuf)>,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut scene = None;
        let mut run = Vec::new();
        let mut obj = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--run" => run.push(args.next().context("--run needs an operation name")?),
                "--obj" => {
                    let model = args.next().context("--obj needs a model name")?;
                    let path = args.next().context("--obj needs an output path")?;
                    obj.push((model, PathBuf::from(path)));
                }
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ if scene.is_some() => bail!("more than one scene given\n{USAGE}"),
                _ => scene = Some(PathBuf::from(arg)),
            }
        }

        Ok(Self {
            scene: scene.with_context(|| format!("no scene given\n{USAGE}"))?,
            run,
            obj,
        })
    }
}
