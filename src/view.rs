//! Page contract the controller drives.
//!
//! Every element the controller touches is named here; implementations map the
//! identifiers onto whatever surface they render to (DOM nodes, a terminal, an
//! in-memory record). Methods take `&self` because a page is shared with event
//! handlers and is mutated through interior handles, like DOM elements are.

use crate::render::SummaryBlock;

/// Form inputs read on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormInput {
    Ticker,
    StartDate,
    EndDate,
}

/// Regions whose visibility or visual state the controller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    ErrorBanner,
    SuccessBanner,
    ResultsPanel,
    Loading,
    ResultsContent,
    /// "negative" visual state of the price change field.
    NegativeChange,
}

/// Text outputs written by the renderer and the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextSlot {
    ErrorBanner,
    SuccessBanner,
    LastClose,
    NextPrice,
    PriceChange,
    DataPoints,
    R2Score,
    Mse,
    Mae,
    Rmse,
    Mape,
}

impl TextSlot {
    pub const OUTPUT_FIELDS: [TextSlot; 9] = [
        TextSlot::LastClose,
        TextSlot::NextPrice,
        TextSlot::PriceChange,
        TextSlot::DataPoints,
        TextSlot::R2Score,
        TextSlot::Mse,
        TextSlot::Mae,
        TextSlot::Rmse,
        TextSlot::Mape,
    ];

    /// Element id used by the HTML page.
    pub fn element_id(&self) -> &'static str {
        match self {
            TextSlot::ErrorBanner => "errorMsg",
            TextSlot::SuccessBanner => "successMsg",
            TextSlot::LastClose => "lastClose",
            TextSlot::NextPrice => "nextPrice",
            TextSlot::PriceChange => "priceChange",
            TextSlot::DataPoints => "dataPoints",
            TextSlot::R2Score => "r2Score",
            TextSlot::Mse => "mse",
            TextSlot::Mae => "mae",
            TextSlot::Rmse => "rmse",
            TextSlot::Mape => "mape",
        }
    }
}

/// User events the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    PredictClicked,
    /// Key pressed while focus is in the ticker input.
    TickerKeyPress(String),
}

impl UiEvent {
    pub fn triggers_submit(&self) -> bool {
        match self {
            UiEvent::PredictClicked => true,
            UiEvent::TickerKeyPress(key) => key == "Enter",
        }
    }
}

pub trait PredictionView: Send + Sync {
    fn input_value(&self, input: FormInput) -> String;
    fn set_input_value(&self, input: FormInput, value: &str);
    fn set_text(&self, slot: TextSlot, text: &str);
    fn set_active(&self, region: Region, active: bool);
    fn set_image_source(&self, source: &str);
    fn set_summary(&self, summary: &SummaryBlock);
}
