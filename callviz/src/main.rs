// Copyright 2025 the Callviz Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `callviz`: the top reasons for service calls as an SVG or HTML bar chart.
//!
//! `render` applies a list of commands and writes the final frame. `repl` reads commands from
//! stdin and rewrites the output after each one.

mod command;
mod config;
mod data;
mod html;
mod state;
mod surface;
mod svg;

#[cfg(test)]
mod controller_tests;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};

use crate::command::Command;
use crate::config::{ChartConfig, Orientation};
use crate::state::ChartState;
use crate::surface::{Controller, SystemClock};
use crate::svg::FileSurface;

const REPORT_TITLE: &str = "Boston 311 calls by reason";

#[derive(Parser)]
#[command(
    name = "callviz",
    version,
    about = "Top-N bar chart of service-call reasons"
)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Apply commands in order and write the final frame
    Render {
        #[command(flatten)]
        chart: ChartArgs,

        /// Command to apply, e.g. "uncheck Street Lights" or "show-more" (repeatable)
        #[arg(short = 'c', long = "command")]
        commands: Vec<Command>,
    },

    /// Read commands from stdin, rewriting the output after each one
    Repl {
        #[command(flatten)]
        chart: ChartArgs,
    },
}

#[derive(Args)]
struct ChartArgs {
    /// CSV with `reason` and `Count` columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path; `.html` writes a report page, anything else plain SVG
    #[arg(short, long, default_value = "callviz.svg")]
    out: PathBuf,

    /// TOML chart configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rows shown before "show-more"
    #[arg(long)]
    top_n: Option<usize>,

    /// Bar direction
    #[arg(long, value_enum)]
    orientation: Option<Orientation>,
}

impl ChartArgs {
    /// The config file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> anyhow::Result<ChartConfig> {
        let mut config = match &self.config {
            Some(path) => ChartConfig::load(path)?,
            None => ChartConfig::default(),
        };
        if let Some(input) = &self.input {
            config.data = Some(input.clone());
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if let Some(o) = self.orientation {
            config.orientation = o;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.mode {
        Mode::Render { chart, commands } => run_render(&chart, &commands),
        Mode::Repl { chart } => run_repl(&chart),
    }
}

fn build_controller(args: &ChartArgs) -> anyhow::Result<Controller<FileSurface, SystemClock>> {
    let config = args.resolve_config()?;
    let Some(input) = config.data.as_deref() else {
        anyhow::bail!("no input CSV: pass --input or set `data` in the config");
    };
    let table = match data::load_records(input) {
        Ok(table) => table,
        Err(err) => {
            // Nothing is rendered after a failed load.
            error!("{err}");
            return Err(err).with_context(|| format!("loading {}", input.display()));
        }
    };
    let state = ChartState::new(&table, config.top_n);
    info!(
        "{} reasons loaded, {} shown",
        state.source.row_count(),
        state.dataset.row_count()
    );
    Ok(Controller::new(
        state,
        config.chart_template()?,
        config.transition(),
        FileSurface::new(args.out.clone(), REPORT_TITLE),
        SystemClock::new(),
    ))
}

fn run_render(args: &ChartArgs, commands: &[Command]) -> anyhow::Result<()> {
    let mut controller = build_controller(args)?;
    controller.render()?;
    for command in commands {
        controller.dispatch(command)?;
    }
    println!("wrote {}", controller.surface().path().display());
    Ok(())
}

fn run_repl(args: &ChartArgs) -> anyhow::Result<()> {
    let mut controller = build_controller(args)?;
    controller.render()?;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "wrote {}; type `help` for commands",
        controller.surface().path().display()
    )?;
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => print_help(&mut stdout)?,
            "list" => {
                for (reason, checked) in controller.state().checkboxes() {
                    writeln!(stdout, "[{}] {reason}", if checked { 'x' } else { ' ' })?;
                }
            }
            text if text.starts_with("filter ") => {
                let keys = text["filter ".len()..]
                    .split(';')
                    .map(str::trim)
                    .filter(|k| !k.is_empty());
                controller.apply_filter(keys)?;
                writeln!(
                    stdout,
                    "filter: {} bars",
                    controller.state().visible().row_count()
                )?;
            }
            text => match text.parse::<Command>() {
                Ok(command) => {
                    controller.dispatch(&command)?;
                    writeln!(
                        stdout,
                        "{command}: {} bars",
                        controller.state().visible().row_count()
                    )?;
                }
                Err(err) => warn!("{err}"),
            },
        }
        stdout.flush()?;
    }
    Ok(())
}

fn print_help(out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "check <reason> | uncheck <reason> | select-all | reset")?;
    writeln!(out, "show-more | toggle | hover <reason> | leave")?;
    writeln!(out, "filter <reason>; <reason>; ...")?;
    writeln!(out, "list | help | quit")
}
