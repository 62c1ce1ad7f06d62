use anyhow::{bail, Context, Result};
use serde::Serialize;

use segscroll_core::{
    CoordinatorStats, HeaderGeometry, ScrollCoordinator, ScrollOffset, ScrollSurface,
};

/// One scripted child assignment and where both surfaces ended up
#[derive(Debug, Serialize)]
struct StepOutcome {
    step: usize,
    requested: f64,
    parent: f64,
    child: f64,
    intervened: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    range: f64,
    steps: Vec<StepOutcome>,
    stats: CoordinatorStats,
}

/// Replay child offsets through a coordinator without a terminal
pub fn run(range: f64, steps: &str, parent_start: f64, json: bool) -> Result<()> {
    let offsets = parse_steps(steps)?;
    let report = simulate(range, &offsets, parent_start)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("range {}", report.range);
    println!("{:>4}  {:>10}  {:>10}  {:>10}  intervened", "step", "requested", "parent", "child");
    for outcome in &report.steps {
        println!(
            "{:>4}  {:>10.2}  {:>10.2}  {:>10.2}  {}",
            outcome.step,
            outcome.requested,
            outcome.parent,
            outcome.child,
            if outcome.intervened { "yes" } else { "no" }
        );
    }
    println!(
        "\nevents {}, interventions {}, ignored {}, dropped {}",
        report.stats.events,
        report.stats.interventions,
        report.stats.ignored,
        report.stats.reentrant_dropped
    );
    Ok(())
}

fn simulate(range: f64, offsets: &[f64], parent_start: f64) -> Result<Report> {
    let geometry = HeaderGeometry::new(range, 0.0, 0.0, 0.0)
        .with_context(|| format!("invalid range {}", range))?;
    if !(0.0..=range).contains(&parent_start) {
        bail!("parent start {} is outside 0..={}", parent_start, range);
    }

    let parent = ScrollSurface::with_offset("parent", ScrollOffset::vertical(parent_start));
    let child = ScrollSurface::new("child");
    let coordinator = ScrollCoordinator::new(parent.clone(), &geometry);
    coordinator.register_child(child.clone());

    let mut steps = Vec::with_capacity(offsets.len());
    for (step, &requested) in offsets.iter().enumerate() {
        let before = coordinator.stats().interventions;
        child.set_offset(ScrollOffset::vertical(requested));
        steps.push(StepOutcome {
            step: step + 1,
            requested,
            parent: parent.offset().y,
            child: child.offset().y,
            intervened: coordinator.stats().interventions > before,
        });
    }

    let stats = coordinator.stats();
    coordinator.teardown();
    Ok(Report { range, steps, stats })
}

/// Parse "0, -20 -30,10" into offsets
fn parse_steps(steps: &str) -> Result<Vec<f64>> {
    let offsets = steps
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid step '{}'", s))
        })
        .collect::<Result<Vec<_>>>()?;

    if offsets.is_empty() {
        bail!("no steps given");
    }
    Ok(offsets)
}
