use crate::api_client::PredictionApi;
use crate::config::{ControllerSettings, OverlapPolicy};
use crate::errors::{FormField, SubmitError, ValidationError};
use crate::models::{PredictionRequest, PredictionResult};
use crate::render::render_result;
use crate::view::{FormInput, PredictionView, Region, TextSlot, UiEvent};
use chrono::{Datelike, Local, NaiveDate};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const FAILURE_MARKER: &str = "❌";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Form lifecycle. A rejected form returns to `Idle` with the error banner
/// shown; `Error` is reserved for submits that reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Rendered(PredictionResult),
    Failed(SubmitError),
    /// Dropped because another request was in flight.
    Ignored,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Rendered(_))
    }
}

/// Start and end defaults: one calendar year back, through today.
///
/// 29 February has no counterpart in the previous year and rolls over to 1 March.
pub fn default_date_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let year = today.year() - 1;
    let start = NaiveDate::from_ymd_opt(year, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(today);
    (start, today)
}

/// Checks raw form values and builds the request sent to the backend.
pub fn validate_inputs(
    ticker: &str,
    start_date: &str,
    end_date: &str,
) -> Result<PredictionRequest, ValidationError> {
    for (field, value) in [
        (FormField::Ticker, ticker),
        (FormField::StartDate, start_date),
        (FormField::EndDate, end_date),
    ] {
        if value.is_empty() {
            return Err(ValidationError::MissingField(field));
        }
    }

    let start = parse_form_date(FormField::StartDate, start_date)?;
    let end = parse_form_date(FormField::EndDate, end_date)?;
    if start >= end {
        return Err(ValidationError::InvalidRange {
            start: start_date.to_string(),
            end: end_date.to_string(),
        });
    }

    Ok(PredictionRequest::new(ticker, start_date, end_date))
}

fn parse_form_date(field: FormField, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct PredictionFormController<V, A> {
    view: V,
    api: A,
    settings: ControllerSettings,
    state: Mutex<UiState>,
    in_flight: AtomicUsize,
}

impl<V, A> PredictionFormController<V, A>
where
    V: PredictionView,
    A: PredictionApi,
{
    pub fn new(view: V, api: A, settings: ControllerSettings) -> Self {
        Self {
            view,
            api,
            settings,
            state: Mutex::new(UiState::Idle),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn state(&self) -> UiState {
        self.state.lock().map(|state| *state).unwrap_or_default()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn initialize(&self) {
        self.initialize_with_today(Local::now().date_naive());
    }

    pub fn initialize_with_today(&self, today: NaiveDate) {
        let (start, end) = default_date_range(today);
        self.view.set_input_value(
            FormInput::StartDate,
            &start.format(ISO_DATE_FORMAT).to_string(),
        );
        self.view
            .set_input_value(FormInput::EndDate, &end.format(ISO_DATE_FORMAT).to_string());
        self.set_state(UiState::Idle);
    }

    /// Routes a user event; returns `None` when the event does not trigger a submit.
    pub async fn handle_event(&self, event: &UiEvent) -> Option<SubmitOutcome> {
        if !event.triggers_submit() {
            return None;
        }
        Some(self.submit().await)
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.ignores_overlap() && self.in_flight() > 0 {
            info!("Prediction already in flight; ignoring submit");
            return SubmitOutcome::Ignored;
        }

        let ticker = self.view.input_value(FormInput::Ticker).to_uppercase();
        let start_date = self.view.input_value(FormInput::StartDate);
        let end_date = self.view.input_value(FormInput::EndDate);

        self.view.set_active(Region::ErrorBanner, false);
        self.view.set_active(Region::SuccessBanner, false);

        let request = match validate_inputs(&ticker, &start_date, &end_date) {
            Ok(request) => request,
            Err(err) => {
                debug!("Prediction form rejected: {}", err);
                let err = SubmitError::from(err);
                self.show_error(&err, UiState::Idle);
                return SubmitOutcome::Failed(err);
            }
        };

        let previous = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);
        if self.ignores_overlap() && previous > 0 {
            info!("Prediction already in flight; ignoring submit");
            return SubmitOutcome::Ignored;
        }

        info!(
            "Requesting prediction for {} ({} - {})",
            request.ticker, request.start_date, request.end_date
        );
        self.set_state(UiState::Loading);
        self.view.set_active(Region::ResultsPanel, true);
        self.view.set_active(Region::Loading, true);
        self.view.set_active(Region::ResultsContent, false);

        match self.api.predict(&request).await {
            Ok(result) => {
                render_result(&self.view, &result, &self.settings);
                self.view.set_active(Region::Loading, false);
                self.view.set_active(Region::ResultsContent, true);
                self.view
                    .set_text(TextSlot::SuccessBanner, &self.settings.messages.success);
                self.view.set_active(Region::SuccessBanner, true);
                self.set_state(UiState::Success);
                info!(
                    "Prediction for {} rendered: next={:.2} r2={:.4}",
                    result.ticker, result.next_price, result.metrics.r2
                );
                SubmitOutcome::Rendered(result)
            }
            Err(err) => {
                warn!("Prediction for {} failed: {}", request.ticker, err);
                self.view.set_active(Region::Loading, false);
                self.show_error(&err, UiState::Error);
                SubmitOutcome::Failed(err)
            }
        }
    }

    fn ignores_overlap(&self) -> bool {
        self.settings.overlap_policy == OverlapPolicy::IgnoreWhileInFlight
    }

    fn show_error(&self, err: &SubmitError, next: UiState) {
        let text = format!(
            "{} {}",
            FAILURE_MARKER,
            err.user_message(&self.settings.messages)
        );
        self.view.set_text(TextSlot::ErrorBanner, &text);
        self.view.set_active(Region::ErrorBanner, true);
        self.set_state(next);
    }

    fn set_state(&self, next: UiState) {
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }
}
