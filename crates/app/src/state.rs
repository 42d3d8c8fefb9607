//! Screen navigation and form state, driven by events.
//!
//! `AppState::apply` is synchronous and total: every event leaves the state
//! valid. The async work (pipeline run, advisory call) happens elsewhere and
//! re-enters through `InspectionCompleted`.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use textilevision_agent::ImageFile;
use textilevision_core::{FabricType, InspectionId, InspectionLog};
use textilevision_pipeline::{AssetUploadStep, InspectionForm};

use crate::stats::DashboardStats;

/// The four screens of the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Dashboard,
    NewInspection,
    History,
    Report(InspectionId),
}

/// Session-local handle standing in for a browser object URL. Created when a
/// file is selected, revoked when the selection is superseded or cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRef {
    url: String,
}

impl PreviewRef {
    pub fn create() -> Self {
        Self {
            url: format!("preview://{}", Uuid::now_v7()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Everything the UI needs to render, in one place.
#[derive(Debug, Default)]
pub struct AppState {
    pub screen: Screen,
    pub log: InspectionLog,
    pub search_query: String,
    pub form: InspectionForm,
    /// User-facing message from the last rejected file selection or failed
    /// run; cleared on dismissal and on navigation to a fresh form.
    pub form_error: Option<String>,
    /// Preview handles no longer referenced by the form. The rendering layer
    /// owns releasing the underlying resources.
    pub revoked_previews: Vec<String>,
}

/// Everything that can happen to the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    OpenDashboard,
    OpenNewInspection,
    OpenHistory,
    /// Ignored when the id is not in the log.
    OpenReport(InspectionId),
    SearchChanged(String),
    BatchIdChanged(String),
    FabricChosen(FabricType),
    /// Validated on selection; a rejected file keeps the previous selection.
    FileSelected(ImageFile),
    FileRemoved,
    /// A successful pipeline run re-enters here: log it and show the report.
    InspectionCompleted(textilevision_core::Inspection),
    ErrorDismissed,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.log)
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::OpenDashboard => self.screen = Screen::Dashboard,
            AppEvent::OpenHistory => self.screen = Screen::History,
            AppEvent::OpenNewInspection => {
                self.reset_form();
                self.screen = Screen::NewInspection;
            }
            AppEvent::OpenReport(id) => {
                if self.log.get(id).is_some() {
                    self.screen = Screen::Report(id);
                } else {
                    warn!(%id, "report navigation ignored; id not in log");
                }
            }
            AppEvent::SearchChanged(query) => self.search_query = query,
            AppEvent::BatchIdChanged(batch_id) => self.form.batch_id = batch_id,
            AppEvent::FabricChosen(fabric) => self.form.fabric_type = Some(fabric),
            AppEvent::FileSelected(file) => self.select_file(file),
            AppEvent::FileRemoved => self.clear_file(),
            AppEvent::InspectionCompleted(inspection) => {
                let id = inspection.id;
                debug!(%id, batch = %inspection.batch_id, "inspection logged");
                self.log.insert_head(inspection);
                // The preview now backs the logged report's image; ownership
                // moves to the inspection, so it must not be revoked.
                self.form.preview_url = String::new();
                self.reset_form();
                self.screen = Screen::Report(id);
            }
            AppEvent::ErrorDismissed => self.form_error = None,
        }
    }

    /// Validate and adopt a newly selected file. Rejection surfaces the
    /// user-facing message and leaves any previous selection (and its
    /// preview) in place.
    fn select_file(&mut self, file: ImageFile) {
        if let Err(err) = AssetUploadStep::validate(&file) {
            self.form_error = Some(err.to_string());
            return;
        }
        self.form_error = None;
        if !self.form.preview_url.is_empty() {
            // Superseded preview; hand it to the renderer for release.
            self.revoked_previews.push(std::mem::take(&mut self.form.preview_url));
        }
        self.form.preview_url = PreviewRef::create().url().to_string();
        self.form.file = Some(file);
    }

    fn clear_file(&mut self) {
        if !self.form.preview_url.is_empty() {
            self.revoked_previews.push(std::mem::take(&mut self.form.preview_url));
        }
        self.form.file = None;
    }

    fn reset_form(&mut self) {
        self.clear_file();
        self.form = InspectionForm::default();
        self.form_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use textilevision_core::{Inspection, InspectionStatus, Verdict};

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", 1_000_000)
    }

    fn completed(batch: &str) -> Inspection {
        Inspection {
            id: InspectionId::new(),
            batch_id: batch.to_string(),
            fabric_type: FabricType::Woven,
            date: Utc::now().date_naive(),
            image_url: String::new(),
            annotated_image_url: None,
            quality_score: 85,
            verdict: Verdict::Pass,
            total_defects: 2,
            critical_count: 0,
            major_count: 0,
            minor_count: 2,
            fabric_condition: "Good".to_string(),
            defects: vec![],
            recommendations: vec![],
            status: InspectionStatus::Completed,
        }
    }

    #[test]
    fn valid_file_selection_creates_a_preview_and_clears_errors() {
        let mut state = AppState::new();
        state.form_error = Some("File size must be under 10MB".to_string());

        state.apply(AppEvent::FileSelected(png("a.png")));
        assert!(state.form.file.is_some());
        assert!(state.form.preview_url.starts_with("preview://"));
        assert!(state.form_error.is_none());
        assert!(state.revoked_previews.is_empty());
    }

    #[test]
    fn rejected_file_keeps_the_previous_selection() {
        let mut state = AppState::new();
        state.apply(AppEvent::FileSelected(png("good.png")));
        let kept_preview = state.form.preview_url.clone();

        state.apply(AppEvent::FileSelected(ImageFile::new(
            "huge.png",
            "image/png",
            11_000_000,
        )));
        assert_eq!(
            state.form_error.as_deref(),
            Some("File size must be under 10MB")
        );
        assert_eq!(state.form.file.as_ref().unwrap().file_name, "good.png");
        assert_eq!(state.form.preview_url, kept_preview);
    }

    #[test]
    fn superseding_a_selection_revokes_the_old_preview() {
        let mut state = AppState::new();
        state.apply(AppEvent::FileSelected(png("first.png")));
        let first_preview = state.form.preview_url.clone();

        state.apply(AppEvent::FileSelected(png("second.png")));
        assert_ne!(state.form.preview_url, first_preview);
        assert_eq!(state.revoked_previews, vec![first_preview]);
    }

    #[test]
    fn removing_the_file_revokes_its_preview() {
        let mut state = AppState::new();
        state.apply(AppEvent::FileSelected(png("a.png")));
        let preview = state.form.preview_url.clone();

        state.apply(AppEvent::FileRemoved);
        assert!(state.form.file.is_none());
        assert!(state.form.preview_url.is_empty());
        assert_eq!(state.revoked_previews, vec![preview]);
    }

    #[test]
    fn completed_inspection_logs_navigates_and_resets_the_form() {
        let mut state = AppState::new();
        state.apply(AppEvent::OpenNewInspection);
        state.apply(AppEvent::BatchIdChanged("BT-1".to_string()));
        state.apply(AppEvent::FabricChosen(FabricType::Silk));
        state.apply(AppEvent::FileSelected(png("a.png")));

        let inspection = completed("BT-1");
        let id = inspection.id;
        state.apply(AppEvent::InspectionCompleted(inspection));

        assert_eq!(state.screen, Screen::Report(id));
        assert_eq!(state.log.len(), 1);
        assert_eq!(state.form, InspectionForm::default());
        // The preview moved into the logged report, so nothing was revoked.
        assert!(state.revoked_previews.is_empty());
    }

    #[test]
    fn completed_report_keeps_its_display_image_out_of_revocation() {
        let mut state = AppState::new();
        state.apply(AppEvent::FileSelected(png("a.png")));

        let mut inspection = completed("BT-4");
        inspection.image_url = state.form.preview_url.clone();
        let image_url = inspection.image_url.clone();
        state.apply(AppEvent::InspectionCompleted(inspection));

        assert!(!state.revoked_previews.contains(&image_url));
        assert_eq!(
            state.log.iter().next().unwrap().display_image(),
            image_url
        );
    }

    #[test]
    fn report_navigation_requires_a_logged_id() {
        let mut state = AppState::new();
        state.apply(AppEvent::OpenReport(InspectionId::new()));
        assert_eq!(state.screen, Screen::Dashboard);

        let inspection = completed("BT-2");
        let id = inspection.id;
        state.log.insert_head(inspection);
        state.apply(AppEvent::OpenReport(id));
        assert_eq!(state.screen, Screen::Report(id));
    }

    #[test]
    fn opening_the_form_starts_from_a_clean_slate() {
        let mut state = AppState::new();
        state.apply(AppEvent::FileSelected(png("a.png")));
        state.apply(AppEvent::BatchIdChanged("BT-3".to_string()));

        state.apply(AppEvent::OpenNewInspection);
        assert_eq!(state.screen, Screen::NewInspection);
        assert_eq!(state.form, InspectionForm::default());
        assert!(state.form_error.is_none());
    }
}
