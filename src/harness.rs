//! The fixed benchmark protocol.

use crate::catalog::{Catalog, Hierarchy};
use crate::dataset::{Dataset, Preset, STANDARD_DATASETS};
use crate::error::Error;
use crate::locality::Shuffler;
use crate::report::Reporter;
use crate::rng;
use crate::strategy::{CastKind, Strategy};
use crate::trial::{self, Sink};
use hashbrown::HashMap;
use log::{debug, info};
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::rc::Rc;

/// The number of objects in every dataset by default.
pub const DEFAULT_LEN: usize = 2_000_000;
/// The seed used by default.
pub const DEFAULT_SEED: u64 = 1;

/// Configuration for a benchmark run.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BenchConfig {
    /// The number of objects in every dataset.
    pub len: usize,
    /// The seed of the generation and shuffling streams.
    pub seed: u64,
}

impl BenchConfig {
    /// Creates a new [`BenchConfig`].
    pub fn new(len: usize, seed: u64) -> Self {
        BenchConfig { len, seed }
    }

    /// Sets the dataset length.
    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            len: DEFAULT_LEN,
            seed: DEFAULT_SEED,
        }
    }
}

/// The repetitions of a run.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum Pass {
    /// Warms up the process. Its numbers are not meant to be read.
    Discard,
    /// Runs over the datasets in allocation order.
    Aligned,
    /// Shuffles every dataset first.
    Shuffled,
}

impl Pass {
    /// All passes in run order.
    pub const ALL: [Pass; 3] = [Pass::Discard, Pass::Aligned, Pass::Shuffled];

    /// The heading used in reports.
    pub fn title(self) -> &'static str {
        match self {
            Pass::Discard => "Run 0 (discard)",
            Pass::Aligned => "Run 1 (objects aligned)",
            Pass::Shuffled => "Run 2 (objects shuffled)",
        }
    }
}

impl Display for Pass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// The strategies of one kind, one per target class of a hierarchy.
///
/// The first one targets the root and is not summed into the average.
#[derive(Debug)]
struct Lineup {
    kind: CastKind,
    strategies: Vec<Strategy>,
}

/// Owns everything a run needs and runs the protocol.
///
/// Everything that can fail is built in [`Harness::new`], so a run never stops between
/// trials for anything but a failed write.
#[derive(Debug)]
pub struct Harness {
    config: BenchConfig,
    catalog: Rc<Catalog>,
    datasets: Vec<(Preset, Dataset)>,
    baseline: Strategy,
    lineups: HashMap<Hierarchy, Vec<Lineup>>,
    shuffler: Shuffler,
    sink: Sink,
}

impl Harness {
    /// Creates a [`Harness`] running the standard datasets.
    pub fn new(config: BenchConfig) -> Result<Self, Error> {
        Self::with_datasets(config, &STANDARD_DATASETS)
    }

    /// Creates a [`Harness`] running the given datasets, in order.
    pub fn with_datasets(
        config: BenchConfig,
        presets: &[(Hierarchy, Preset)],
    ) -> Result<Self, Error> {
        let catalog = Rc::new(Catalog::standard()?);
        debug!("Built catalog with {} classes", catalog.len());

        let mut source = rng::stream(config.seed, "generate");
        let mut datasets = Vec::with_capacity(presets.len());
        for &(hierarchy, preset) in presets {
            let skew = preset.skew();
            let dataset = Dataset::generate(&catalog, hierarchy, skew, config.len, &mut source)?;
            datasets.push((preset, dataset));
        }

        let mut lineups = HashMap::new();
        for hierarchy in Hierarchy::ALL {
            let mut targets = catalog.slots(hierarchy).to_vec();
            targets.push(catalog.unrelated());

            let hierarchy_lineups = CastKind::ALL
                .iter()
                .map(|&kind| Lineup {
                    kind,
                    strategies: targets
                        .iter()
                        .map(|&target| kind.strategy(&catalog, target))
                        .collect(),
                })
                .collect();
            lineups.insert(hierarchy, hierarchy_lineups);
        }

        info!(
            "Prepared {} datasets of {} objects with seed {}",
            datasets.len(),
            config.len,
            config.seed
        );
        Ok(Harness {
            config,
            catalog,
            datasets,
            baseline: Strategy::baseline(),
            lineups,
            shuffler: Shuffler::new(config.seed),
            sink: Sink::new(),
        })
    }

    /// The configuration of the run.
    pub fn config(&self) -> BenchConfig {
        self.config
    }

    /// The class catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The datasets in report order.
    pub fn datasets(&self) -> impl Iterator<Item = (Preset, &Dataset)> + '_ {
        self.datasets.iter().map(|(preset, dataset)| (*preset, dataset))
    }

    /// The measurement sink.
    pub fn sink(&self) -> Sink {
        self.sink
    }

    /// Runs all passes and writes the report to `out`, then gives `out` back.
    pub fn run<W: Write>(&mut self, out: W) -> Result<W, Error> {
        let mut reporter = Reporter::new(out);
        for pass in Pass::ALL {
            self.run_pass(pass, &mut reporter)?;
        }
        reporter.footer(&self.sink)?;
        info!("Done, sink value {}", self.sink.value());
        Ok(reporter.into_inner())
    }

    /// Runs a single pass over every dataset.
    pub fn run_pass<W: Write>(
        &mut self,
        pass: Pass,
        reporter: &mut Reporter<W>,
    ) -> Result<(), Error> {
        info!("Starting {}", pass);
        reporter.begin_pass(pass.title())?;
        if pass == Pass::Shuffled {
            for (_, dataset) in self.datasets.iter_mut() {
                self.shuffler.shuffle(dataset);
            }
        }

        let mut current = None;
        for (preset, dataset) in &self.datasets {
            let hierarchy = dataset.hierarchy();
            if current != Some(hierarchy) {
                reporter.hierarchy(hierarchy)?;
                current = Some(hierarchy);
            }
            let title = preset.title(&self.catalog, hierarchy);
            debug!("{}: {} hierarchy, {}", pass, hierarchy, title);
            reporter.dataset(&title)?;

            let lineups = self.lineups.get(&hierarchy).map(Vec::as_slice).unwrap_or(&[]);
            run_dataset(dataset, &self.baseline, lineups, &mut self.sink, reporter)?;
        }
        Ok(())
    }
}

fn run_dataset<W: Write>(
    dataset: &Dataset,
    baseline: &Strategy,
    lineups: &[Lineup],
    sink: &mut Sink,
    reporter: &mut Reporter<W>,
) -> Result<(), Error> {
    let warmed = trial::warm(dataset, baseline, sink);
    sink.fold(warmed as f64);

    reporter.begin_block("Base-line", "static")?;
    let result = trial::run_trial(dataset, baseline, sink);
    reporter.trial(baseline.label(), &result, false)?;
    reporter.end_block()?;

    for lineup in lineups {
        reporter.begin_block("Implementation", lineup.kind.name())?;
        let (root, targets) = match lineup.strategies.split_first() {
            Some(split) => split,
            None => continue,
        };

        let result = trial::run_trial(dataset, root, sink);
        sink.fold(result.rate());
        reporter.trial(root.label(), &result, false)?;

        for strategy in targets {
            let result = trial::run_trial(dataset, strategy, sink);
            reporter.trial(strategy.label(), &result, true)?;
        }
        reporter.average()?;
        reporter.end_block()?;
    }
    Ok(())
}
