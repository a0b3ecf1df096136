//! Export orchestration.

use crate::assembler::DocumentAssembler;
use crate::collect::{discover_modules, ContentCollector, DbInfo};
use crate::config::ReportConfig;
use crate::delivery::Delivery;
use crate::error::{ExportError, Result};
use crate::i18n::Locale;
use crate::namer::extract_identity;
use crate::rasterize::{AssetRasterizer, ChartRuntime};
use crate::snapshot::{ExportArtifact, ExportOutcome, ReportSnapshot};
use crate::theme::{Theme, ThemeResolver};
use crate::view::LiveView;
use chrono::{DateTime, FixedOffset};
use rsnap_common::ExportId;
use rsnap_config::PreferenceStore;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, info_span, warn};

/// Runs exports: naming, theming, collection, assembly, delivery.
///
/// One exporter runs at most one export at a time; overlapping calls fail
/// with [`ExportError::AlreadyRunning`].
pub struct Exporter<R, D> {
    config: ReportConfig,
    resolver: ThemeResolver,
    assembler: DocumentAssembler,
    runtime: R,
    delivery: D,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the export ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: ChartRuntime, D: Delivery> Exporter<R, D> {
    /// Create an exporter. Fails on invalid configuration.
    pub fn new(config: ReportConfig, runtime: R, delivery: D) -> Result<Self> {
        config.validate()?;
        let resolver = ThemeResolver::new().with_overrides(config.theme_overrides.clone());
        Ok(Self {
            assembler: DocumentAssembler::new(config.clone()),
            config,
            resolver,
            runtime,
            delivery,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The delivery artifacts are handed to.
    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    /// Whether an export is running.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Resolve the theme an export would use.
    pub fn theme<P: PreferenceStore>(&self, prefs: &P) -> Theme {
        self.resolver.resolve_from(prefs)
    }

    /// Export the view's current state and deliver the document.
    pub fn export_report<V, P>(
        &self,
        view: &mut V,
        prefs: &P,
        now: DateTime<FixedOffset>,
    ) -> Result<ExportOutcome>
    where
        V: LiveView + ?Sized,
        P: PreferenceStore,
    {
        let Some(_running) = InFlight::acquire(&self.in_flight) else {
            warn!("export requested while another is running");
            return Err(ExportError::AlreadyRunning);
        };

        let export_id = ExportId::new();
        let span = info_span!("export", export_id = %export_id);
        let _enter = span.enter();

        let theme = self.theme(prefs);
        let locale = Locale::from_lang(view.lang());
        let snapshot = self.capture(view, now);
        let file_name = snapshot.identity.file_name(&snapshot.generated_at);
        debug!(file_name = %file_name, palette = %theme.palette, locale = %locale, "export prepared");

        let document = self.assembler.assemble(&snapshot, &theme, locale)?;
        let artifact = ExportArtifact {
            file_name,
            document,
        };
        let path = self.delivery.deliver(&artifact)?;

        let outcome = ExportOutcome {
            export_id: export_id.to_string(),
            path,
            file_name: artifact.file_name.clone(),
            bytes: artifact.len(),
            modules: snapshot.modules.len(),
            missing_modules: snapshot.missing_modules().map(|m| m.id.clone()).collect(),
        };
        info!(
            file_name = %outcome.file_name,
            path = %outcome.path.display(),
            bytes = outcome.bytes,
            modules = outcome.modules,
            missing = outcome.missing_modules.len(),
            "Report exported"
        );
        Ok(outcome)
    }

    /// Capture identity, modules and fragments without assembling.
    pub fn capture<V: LiveView + ?Sized>(&self, view: &mut V, now: DateTime<FixedOffset>) -> ReportSnapshot {
        let db_info = DbInfo::from_view(view);
        let identity = extract_identity(db_info.element());
        let locale = Locale::from_lang(view.lang());

        let modules = discover_modules(view);
        let collector = ContentCollector::new(AssetRasterizer::new(
            &self.runtime,
            self.config.chart_class.as_str(),
        ))
        .with_overview_module(self.config.overview_module_id.as_str());
        let fragments = collector.collect(view, &modules);

        ReportSnapshot {
            modules,
            db_info_markup: db_info.to_markup(locale),
            identity,
            fragments,
            generated_at: now,
        }
    }
}
