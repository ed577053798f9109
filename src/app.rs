use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use eframe::egui::{self, RichText};

use crate::analysis::{spawn_analysis, AnalysisMessage, AnalysisResult};
use crate::artifact::{fetch_sample, ImageArtifact, Sample, SAMPLES};
use crate::preview::{decode_color_image, PreviewSlot};
use crate::workflow::{AnalysisWorkflow, WorkflowState};

const APP_TITLE: &str = "Cattle Trait Analyzer";
const APP_TAGLINE: &str = "Upload a cattle image to estimate physical traits and score";
const PREVIEW_MAX_HEIGHT: f32 = 280.0;
const POLL_INTERVAL: Duration = Duration::from_millis(16);

pub struct CattleTraitApp {
    workflow: AnalysisWorkflow,
    preview: PreviewSlot,
    analysis_receiver: Option<Receiver<AnalysisMessage>>,
    sample_receiver: Option<Receiver<Result<ImageArtifact, String>>>,
    status_line: String,
}

impl Default for CattleTraitApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CattleTraitApp {
    pub fn new() -> Self {
        CattleTraitApp {
            workflow: AnalysisWorkflow::new(),
            preview: PreviewSlot::new(),
            analysis_receiver: None,
            sample_receiver: None,
            status_line: String::new(),
        }
    }

    fn apply_selection(&mut self, ctx: &egui::Context, artifact: ImageArtifact) {
        let color_image = match decode_color_image(&artifact.bytes) {
            Ok(color_image) => color_image,
            Err(err) => {
                // No preview can exist for an undecodable artifact, so the
                // prior selection stays in place.
                log::warn!("Discarded undecodable image {}: {err:#}", artifact.name);
                return;
            }
        };

        self.preview.set(ctx, color_image);
        self.workflow.select_artifact(artifact);
        self.status_line.clear();
    }

    fn open_image(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp"])
            .pick_file();

        let Some(path) = picked else {
            return;
        };
        match ImageArtifact::from_path(&path) {
            Ok(artifact) => self.apply_selection(ctx, artifact),
            Err(err) => {
                self.status_line = format!("Error opening {}: {err:#}", path.display());
            }
        }
    }

    fn start_sample_fetch(&mut self, sample: Sample) {
        if self.sample_receiver.is_some() {
            self.status_line = "Sample fetch already in progress.".to_string();
            return;
        }

        self.status_line = format!("Fetching {}...", sample.suggested_name);
        let (tx, rx) = mpsc::channel::<Result<ImageArtifact, String>>();
        thread::spawn(move || {
            let result = fetch_sample(&sample).map_err(|err| format!("{err:#}"));
            let _ = tx.send(result);
        });
        self.sample_receiver = Some(rx);
    }

    fn poll_sample_fetch(&mut self, ctx: &egui::Context) {
        let Some(receiver) = self.sample_receiver.take() else {
            return;
        };

        match receiver.try_recv() {
            Ok(Ok(artifact)) => {
                self.status_line.clear();
                self.apply_selection(ctx, artifact);
            }
            Ok(Err(err)) => {
                // Fetch failures are diagnostic-only; the current selection
                // is left untouched.
                log::warn!("Failed to load sample image: {err}");
                self.status_line.clear();
            }
            Err(TryRecvError::Empty) => {
                self.sample_receiver = Some(receiver);
                ctx.request_repaint_after(POLL_INTERVAL);
            }
            Err(TryRecvError::Disconnected) => {
                log::warn!("Sample fetch worker exited before sending a result");
                self.status_line.clear();
            }
        }
    }

    fn start_analysis(&mut self) {
        let Some(request) = self.workflow.begin_analysis() else {
            return;
        };
        // Replacing the receiver orphans any still-running worker; its
        // completion carries a stale token either way.
        self.analysis_receiver = Some(spawn_analysis(request.artifact, request.token));
    }

    fn poll_analysis(&mut self, ctx: &egui::Context) {
        let Some(receiver) = self.analysis_receiver.take() else {
            return;
        };

        match receiver.try_recv() {
            Ok((token, Ok(result))) => {
                if !self.workflow.finish_analysis(token, result) {
                    log::debug!("Discarded stale analysis completion (token {token})");
                }
            }
            Ok((token, Err(err))) => {
                log::warn!("Analysis failed: {err}");
                if !self.workflow.fail_analysis(token, err) {
                    log::debug!("Discarded stale analysis failure (token {token})");
                }
            }
            Err(TryRecvError::Empty) => {
                self.analysis_receiver = Some(receiver);
                ctx.request_repaint_after(POLL_INTERVAL);
            }
            Err(TryRecvError::Disconnected) => {
                if let Some(token) = self.workflow.in_flight_token() {
                    self.workflow.fail_analysis(
                        token,
                        "analysis worker exited before returning a result".to_string(),
                    );
                }
            }
        }
    }

    fn reset(&mut self) {
        // An in-flight completion is not cancelled; it expires against its
        // stale token when it arrives.
        self.workflow.reset();
        self.preview.clear();
        self.status_line.clear();
    }

    fn show_upload_panel(&self, ui: &mut egui::Ui) -> UploadActions {
        let mut actions = UploadActions::default();

        ui.add_space(4.0);
        ui.strong("Upload Image");
        ui.add_space(6.0);

        if ui.button("Choose Image...").clicked() {
            actions.open_image = true;
        }
        match self.workflow.artifact() {
            Some(artifact) => {
                ui.label(RichText::new(&artifact.name).monospace());
            }
            None => {
                ui.label(RichText::new("No image selected.").weak());
            }
        }
        ui.label(RichText::new("Supported: JPG, PNG. Max ~5MB.").weak().small());

        ui.add_space(10.0);
        ui.label("Or pick a sample");
        ui.horizontal(|ui| {
            for sample in SAMPLES {
                if ui.button(sample.label).clicked() {
                    actions.fetch_sample = Some(sample);
                }
            }
        });

        if let Some(texture) = self.preview.handle() {
            ui.add_space(10.0);
            let size = texture.size_vec2();
            let scale = (ui.available_width() / size.x)
                .min(PREVIEW_MAX_HEIGHT / size.y)
                .min(1.0);
            ui.image((texture.id(), size * scale));
        }

        ui.add_space(10.0);
        let analyzing = self.workflow.is_analyzing();
        ui.horizontal(|ui| {
            let analyze_label = if analyzing {
                "Analyzing..."
            } else {
                "Analyze Traits"
            };
            if ui
                .add_enabled(
                    self.workflow.can_analyze(),
                    egui::Button::new(analyze_label),
                )
                .clicked()
            {
                actions.analyze = true;
            }
            if ui
                .add_enabled(
                    self.workflow.can_reset() && !analyzing,
                    egui::Button::new("Reset"),
                )
                .clicked()
            {
                actions.reset = true;
            }
        });

        actions
    }

    fn show_results_panel(&self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.strong("Results");
        ui.separator();

        match self.workflow.state() {
            WorkflowState::Complete => {
                if let Some(result) = self.workflow.result() {
                    show_results(ui, result);
                }
            }
            WorkflowState::Analyzing => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Analyzing image...");
                });
            }
            WorkflowState::Failed => {
                if let Some(message) = self.workflow.failure_message() {
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        format!("Analysis failed: {message}"),
                    );
                }
                ui.label(RichText::new("Use Analyze Traits to retry.").weak());
            }
            WorkflowState::Empty | WorkflowState::Ready => {
                ui.label(
                    RichText::new("No analysis yet. Upload an image and click Analyze.").weak(),
                );
            }
        }
    }
}

#[derive(Default)]
struct UploadActions {
    open_image: bool,
    fetch_sample: Option<Sample>,
    analyze: bool,
    reset: bool,
}

fn show_results(ui: &mut egui::Ui, result: &AnalysisResult) {
    egui::Grid::new("trait-measurements")
        .num_columns(2)
        .spacing([40.0, 6.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("Height");
            ui.strong(format!("{} cm", result.height_cm));
            ui.end_row();

            ui.label("Length");
            ui.strong(format!("{} cm", result.length_cm));
            ui.end_row();

            ui.label("Girth");
            ui.strong(format!("{} cm", result.girth_cm));
            ui.end_row();

            ui.label("Body Condition");
            ui.strong(result.body_condition.label());
            ui.end_row();
        });

    ui.add_space(14.0);
    ui.strong(RichText::new(format!("{}/100", result.score)).size(32.0));
    ui.label(RichText::new("Composite Trait Score").weak());
    ui.add_space(6.0);
    ui.add(egui::ProgressBar::new(result.score as f32 / 100.0));
}

impl eframe::App for CattleTraitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_sample_fetch(ctx);
        self.poll_analysis(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading(APP_TITLE);
            ui.label(RichText::new(APP_TAGLINE).weak());
            ui.add_space(6.0);
        });

        if !self.status_line.is_empty() {
            egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
                ui.label(RichText::new(&self.status_line).weak());
            });
        }

        let mut actions = UploadActions::default();
        egui::SidePanel::left("upload")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                actions = self.show_upload_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_results_panel(ui);
        });

        if actions.open_image {
            self.open_image(ctx);
        }
        if let Some(sample) = actions.fetch_sample {
            self.start_sample_fetch(sample);
        }
        if actions.analyze {
            self.start_analysis();
        }
        if actions.reset {
            self.reset();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::debug!(
            "preview teardown after {} allocations, {} revocations",
            self.preview.allocations(),
            self.preview.revocations()
        );
        self.preview.clear();
    }
}
