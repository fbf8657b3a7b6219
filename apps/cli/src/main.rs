// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic modeler command-line driver.
//!
//! Loads a JSON scene description, brings every continuous operation up to
//! date, applies the operations named with `--run`, then prints the
//! description of every node written along the way.
//!
//! ```text
//! dynmod scene.json --run maker --obj merged merged.obj
//! ```
//!
//! Environment:
//!
//! - `RUST_LOG` - log filter (logs go to stderr)
//! - `DYNMOD_PRETTY_JSON` - pretty-print the report (default on)
//! - `DYNMOD_MERGE_TOLERANCE`, `DYNMOD_HANDLE_LENGTH`,
//!   `DYNMOD_MAX_DISPATCH_ROUNDS` - engine tunables

use std::fs;

use anyhow::{Context, Result};
use dynmod_engine::{DispatchReport, ModelerConfig, ModelerLogic, ToolCatalog};
use dynmod_scene::{NodeDescription, NodeKey, Scene, SceneDescription};
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod args;
mod config;
mod obj;

use args::Args;
use config::Config;

/// What the session did, printed to stdout.
#[derive(Debug, Serialize)]
struct Report {
    rounds: usize,
    runs: usize,
    failures: usize,
    truncated: bool,
    written: Vec<NodeDescription>,
}

impl Report {
    fn add(&mut self, dispatch: DispatchReport) {
        self.rounds += dispatch.rounds;
        self.runs += dispatch.runs;
        self.failures += dispatch.failures;
        self.truncated |= dispatch.truncated;
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let engine_config = ModelerConfig::from_env();
    tracing::info!(
        scene = %args.scene.display(),
        merge_tolerance = engine_config.merge_tolerance,
        handle_length = engine_config.handle_length,
        "Starting dynamic modeler"
    );

    let text = fs::read_to_string(&args.scene)
        .with_context(|| format!("reading {}", args.scene.display()))?;
    let description: SceneDescription = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.scene.display()))?;
    let (mut scene, names) = Scene::from_description(&description)?;
    tracing::info!(
        nodes = description.nodes.len(),
        operations = description.operations.len(),
        "Scene loaded"
    );

    let revisions: FxHashMap<NodeKey, u64> =
        scene.iter().map(|(key, node)| (key, node.revision)).collect();

    let mut logic = ModelerLogic::new(ToolCatalog::with_default_tools(), engine_config);
    let mut report = Report {
        rounds: 0,
        runs: 0,
        failures: 0,
        truncated: false,
        written: Vec::new(),
    };
    report.add(logic.update_all(&mut scene));

    for name in &args.run {
        let operation = lookup(&names, name)?;
        let succeeded = logic
            .run_operation(&mut scene, operation)
            .with_context(|| format!("running {name}"))?;
        tracing::info!(operation = %name, succeeded, "Applied operation");
        report.runs += 1;
        if !succeeded {
            report.failures += 1;
        }
        report.add(logic.process_notifications(&mut scene));
    }

    for (key, node) in scene.iter() {
        if revisions.get(&key) == Some(&node.revision) {
            continue;
        }
        if let Some(description) = scene.describe_node(key)? {
            report.written.push(description);
        }
    }

    for (model, path) in &args.obj {
        let key = lookup(&names, model)?;
        let mesh = scene
            .get(key)
            .and_then(|node| node.data.mesh())
            .with_context(|| format!("{model} is not a model"))?;
        obj::export_obj(path, model, mesh)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(model = %model, path = %path.display(), "Exported OBJ");
    }

    let json = if config.pretty_json {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    tracing::info!(
        runs = report.runs,
        failures = report.failures,
        written = report.written.len(),
        "Done"
    );
    Ok(())
}

fn lookup(names: &FxHashMap<String, NodeKey>, name: &str) -> Result<NodeKey> {
    names
        .get(name)
        .copied()
        .with_context(|| format!("no node named {name}"))
}
