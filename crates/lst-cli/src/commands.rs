use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use serde::Serialize;

use lst_diff::{compute_ranges, CancellationToken, DiffMode, DiffStats};
use lst_projector::{ChangesBlock, FoldingLayout, Viewport, VisibleRangeProjector};
use lst_text::Document;
use lst_tracker::{LineStatusTracker, TrackerConfig, TrackerStatus};
use lst_types::{split_lines, Range, RangeKind};

use crate::cli::*;
use crate::script::{self, Step};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(args, format),
        Command::Replay(args) => cmd_replay(args, format),
        Command::Gutter(args) => cmd_gutter(args, format),
    }
}

struct Pair {
    baseline: String,
    current: String,
    config: TrackerConfig,
}

impl Pair {
    fn load(args: &PairArgs) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => TrackerConfig::from_toml_str(&read(path)?)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TrackerConfig::default(),
        };
        if args.smart {
            config.mode = DiffMode::Smart;
        }
        Ok(Self {
            baseline: read(&args.baseline)?,
            current: read(&args.current)?,
            config,
        })
    }

    fn track(&self) -> Arc<LineStatusTracker> {
        let tracker = LineStatusTracker::new(Document::shared(&self.current), self.config.clone());
        tracker.set_baseline(&self.baseline);
        tracker
    }
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---- diff ----

#[derive(Serialize)]
struct DiffReport {
    ranges: Vec<Range>,
    stats: DiffStats,
}

fn cmd_diff(args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let pair = Pair::load(&args.pair)?;
    let ranges = compute_ranges(
        &split_lines(&pair.current),
        &split_lines(&pair.baseline),
        pair.config.mode,
        &pair.config.limits,
        &CancellationToken::new(),
    )
    .with_context(|| {
        format!(
            "comparing {} against {}",
            args.pair.current.display(),
            args.pair.baseline.display()
        )
    })?;
    tracing::info!(ranges = ranges.len(), mode = ?pair.config.mode, "diff computed");

    let report = DiffReport {
        stats: DiffStats::of(&ranges),
        ranges,
    };
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            print!("{}", render_ranges(&report.ranges));
            println!("{}", render_stats(&report.stats, report.ranges.len()));
            Ok(())
        }
    }
}

fn paint(kind: RangeKind, text: &str) -> ColoredString {
    match kind {
        RangeKind::Inserted => text.green(),
        RangeKind::Deleted => text.red(),
        RangeKind::Modified => text.yellow(),
        RangeKind::Equal => text.dimmed(),
    }
}

fn render_ranges(ranges: &[Range]) -> String {
    let mut out = String::new();
    for range in ranges {
        let _ = write!(
            out,
            "  {} lines {}..{} <- baseline {}..{}",
            paint(range.kind, &format!("{:<8}", range.kind)),
            range.line1,
            range.line2,
            range.vcs_line1,
            range.vcs_line2
        );
        if range.is_whitespace_only() {
            let _ = write!(out, " {}", "(whitespace only)".dimmed());
        }
        out.push('\n');
    }
    out
}

fn render_stats(stats: &DiffStats, ranges: usize) -> String {
    if stats.is_empty() {
        return format!("{} No changes.", "✓".green().bold());
    }
    format!(
        "{} range(s), {} {}, {} modified",
        ranges.to_string().bold(),
        format!("+{}", stats.inserted).green(),
        format!("-{}", stats.deleted).red(),
        stats.modified_ranges
    )
}

// ---- replay ----

#[derive(Serialize)]
struct ReplayFrame {
    step: usize,
    op: String,
    status: TrackerStatus,
    ranges: Option<Vec<Range>>,
}

fn cmd_replay(args: ReplayArgs, format: OutputFormat) -> anyhow::Result<()> {
    let pair = Pair::load(&args.pair)?;
    let steps = script::parse(&read(&args.script)?)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    let frames = replay(&pair, &steps)?;
    match format {
        OutputFormat::Json => print_json(&frames),
        OutputFormat::Text => {
            for frame in &frames {
                print!("{}", render_frame(frame));
            }
            Ok(())
        }
    }
}

fn replay(pair: &Pair, steps: &[Step]) -> anyhow::Result<Vec<ReplayFrame>> {
    let tracker = pair.track();
    let frame = |step: usize, op: String| ReplayFrame {
        step,
        op,
        ranges: tracker.ranges(),
        status: tracker.status(),
    };

    let mut frames = vec![frame(0, "initial".to_string())];
    for (i, step) in steps.iter().enumerate() {
        tracing::debug!(step = i + 1, op = %step.label(), "applying step");
        step.apply(&tracker)
            .with_context(|| format!("step {}: {}", i + 1, step.label()))?;
        frames.push(frame(i + 1, step.label()));
    }
    tracker.release();
    Ok(frames)
}

fn render_frame(frame: &ReplayFrame) -> String {
    let mut out = format!(
        "{} {} [{}]\n",
        format!("#{}", frame.step).yellow().bold(),
        frame.op,
        frame.status.to_string().cyan()
    );
    match &frame.ranges {
        Some(ranges) if ranges.is_empty() => out.push_str("  (no changes)\n"),
        Some(ranges) => out.push_str(&render_ranges(ranges)),
        None => out.push_str("  (not tracked)\n"),
    }
    out
}

// ---- gutter ----

fn cmd_gutter(args: GutterArgs, format: OutputFormat) -> anyhow::Result<()> {
    let pair = Pair::load(&args.pair)?;
    let viewport = Viewport::new(
        args.start,
        args.rows.map_or(usize::MAX, |rows| args.start.saturating_add(rows)),
    );
    let blocks = gutter(&pair, FoldingLayout::new(args.folds), viewport)?;
    match format {
        OutputFormat::Json => print_json(&blocks),
        OutputFormat::Text => {
            print!("{}", render_blocks(&blocks));
            Ok(())
        }
    }
}

fn gutter(pair: &Pair, layout: FoldingLayout, viewport: Viewport) -> anyhow::Result<Vec<ChangesBlock>> {
    let tracker = pair.track();
    let ranges = tracker
        .ranges()
        .with_context(|| format!("document is not tracked ({})", tracker.status()))?;
    tracker.release();
    Ok(VisibleRangeProjector::new(&layout).project(&ranges, viewport))
}

fn render_blocks(blocks: &[ChangesBlock]) -> String {
    if blocks.is_empty() {
        return "No visible changes.\n".to_string();
    }
    let mut out = String::new();
    for block in blocks {
        let ids: Vec<String> = block.ranges.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "block {}", ids.join(" ").dimmed());
        for lines in &block.lines {
            let rows = if lines.is_marker() {
                format!("above row {}", lines.y1)
            } else {
                format!("rows {}..{}", lines.y1, lines.y2)
            };
            let ws = if lines.whitespace_only { " (whitespace only)" } else { "" };
            let _ = writeln!(out, "  {} {}{}", paint(lines.kind, &format!("{:<8}", lines.kind)), rows, ws);
        }
    }
    out
}
