use crate::config::{FilterKind, ReferenceMode, SystemConfig};
use crate::error::Result;
use crate::signal_processing::{
    ButterworthFilter, DesiredSignal, Filter, FirFilterCore, IirCoefficients, IirFilter, LmsFilter,
};

/// One filter of any family, selected at run time
pub enum FilterEngine {
    Bypass,
    Fir(FirFilterCore),
    Iir(IirFilter),
    Adaptive(LmsFilter),
    Butterworth(ButterworthFilter),
}

impl FilterEngine {
    /// Build the filter of `kind` from the configuration
    pub fn build(kind: FilterKind, config: &SystemConfig) -> Result<Self> {
        let engine = match kind {
            FilterKind::Bypass => Self::Bypass,
            FilterKind::Fir => Self::Fir(FirFilterCore::new(config.filter.fir_taps.clone())?),
            FilterKind::Iir => Self::Iir(IirFilter::new(IirCoefficients::new(
                config.filter.iir_b.clone(),
                config.filter.iir_a.clone(),
            )?)),
            FilterKind::Adaptive => {
                let desired = match config.adaptive.reference {
                    ReferenceMode::ScaledInput => {
                        DesiredSignal::ScaledInput(config.adaptive.desired_gain)
                    }
                    ReferenceMode::External => DesiredSignal::External,
                };
                Self::Adaptive(LmsFilter::new(
                    config.adaptive.taps,
                    config.adaptive.step_size,
                    desired,
                )?)
            }
            FilterKind::Butterworth => Self::Butterworth(ButterworthFilter::from_config(
                &config.filter.butterworth,
                config.sampling.period.as_hz(),
            )?),
        };
        Ok(engine)
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Bypass => FilterKind::Bypass,
            Self::Fir(_) => FilterKind::Fir,
            Self::Iir(_) => FilterKind::Iir,
            Self::Adaptive(_) => FilterKind::Adaptive,
            Self::Butterworth(_) => FilterKind::Butterworth,
        }
    }

    /// Process a sample together with an external desired signal.
    ///
    /// Only the adaptive filter uses the reference; every other family
    /// ignores it.
    pub fn process_with_reference(&mut self, sample: f32, reference: f32) -> f32 {
        match self {
            Self::Adaptive(lms) => lms.process_with_reference(sample, reference).output,
            other => other.process(sample),
        }
    }
}

impl Filter for FilterEngine {
    fn process(&mut self, sample: f32) -> f32 {
        match self {
            Self::Bypass => sample,
            Self::Fir(f) => f.process(sample),
            Self::Iir(f) => f.process(sample),
            Self::Adaptive(f) => f.process(sample),
            Self::Butterworth(f) => Filter::process(f, sample),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Bypass => {}
            Self::Fir(f) => f.reset(),
            Self::Iir(f) => f.reset(),
            Self::Adaptive(f) => f.reset(),
            Self::Butterworth(f) => Filter::reset(f),
        }
    }
}

const ALL_KINDS: [FilterKind; 5] = [
    FilterKind::Bypass,
    FilterKind::Fir,
    FilterKind::Iir,
    FilterKind::Adaptive,
    FilterKind::Butterworth,
];

/// Every filter family built once, with one of them active
///
/// The configured kind must build. Another family that cannot be designed
/// for this configuration (a Butterworth cutoff above Nyquist, say) is left
/// out with a warning, and selecting it falls back to bypass.
pub struct FilterBank {
    engines: Vec<Option<FilterEngine>>,
    active: FilterKind,
}

impl FilterBank {
    pub fn from_config(config: &SystemConfig) -> Result<Self> {
        let mut engines = Vec::with_capacity(ALL_KINDS.len());
        for kind in ALL_KINDS {
            match FilterEngine::build(kind, config) {
                Ok(engine) => engines.push(Some(engine)),
                Err(e) if kind != config.filter.kind => {
                    log::warn!("{} filter unavailable: {}", kind.label(), e);
                    engines.push(None);
                }
                Err(e) => return Err(e),
            }
        }
        log::info!("Filter bank ready, active: {}", config.filter.kind.label());
        Ok(Self {
            engines,
            active: config.filter.kind,
        })
    }

    /// Switch the active filter; the newly selected filter starts from zero state
    ///
    /// Returns the kind actually selected.
    pub fn select(&mut self, kind: FilterKind) -> FilterKind {
        let kind = if self.is_available(kind) {
            kind
        } else {
            log::warn!("{} filter unavailable, using bypass", kind.label());
            FilterKind::Bypass
        };
        self.active = kind;
        self.active_mut().reset();
        log::info!("Selected {} filter", kind.label());
        kind
    }

    /// Select by numeric id; unknown ids select bypass
    pub fn select_id(&mut self, id: u8) -> FilterKind {
        self.select(FilterKind::from_id(id))
    }

    pub fn active(&self) -> FilterKind {
        self.active
    }

    pub fn active_mut(&mut self) -> &mut FilterEngine {
        let slot = &mut self.engines[self.active.id() as usize];
        slot.get_or_insert(FilterEngine::Bypass)
    }

    pub fn engine(&self, kind: FilterKind) -> Option<&FilterEngine> {
        self.engines[kind.id() as usize].as_ref()
    }

    pub fn is_available(&self, kind: FilterKind) -> bool {
        self.engine(kind).is_some()
    }

    pub fn process_with_reference(&mut self, sample: f32, reference: f32) -> f32 {
        self.active_mut().process_with_reference(sample, reference)
    }

    /// Clear the history of every filter, not just the active one
    pub fn reset_all(&mut self) {
        for engine in self.engines.iter_mut().flatten() {
            engine.reset();
        }
    }
}

impl Filter for FilterBank {
    fn process(&mut self, sample: f32) -> f32 {
        self.active_mut().process(sample)
    }

    fn reset(&mut self) {
        self.active_mut().reset()
    }
}
