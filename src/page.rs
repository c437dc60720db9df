use crate::render::SummaryBlock;
use crate::view::{FormInput, PredictionView, Region, TextSlot};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;
use std::sync::{Arc, Mutex};

/// Page held in memory. Cloning yields another handle to the same page.
#[derive(Clone, Default)]
pub struct InMemoryPage {
    inner: Arc<Mutex<PageData>>,
}

#[derive(Default)]
struct PageData {
    inputs: HashMap<FormInput, String>,
    texts: BTreeMap<TextSlot, String>,
    active: HashSet<Region>,
    image_source: Option<String>,
    summary: Option<SummaryBlock>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageSnapshot {
    pub inputs: HashMap<FormInput, String>,
    pub texts: BTreeMap<TextSlot, String>,
    pub active: HashSet<Region>,
    pub image_source: Option<String>,
    pub summary: Option<SummaryBlock>,
}

impl PageSnapshot {
    pub fn text(&self, slot: TextSlot) -> &str {
        self.texts.get(&slot).map(String::as_str).unwrap_or("")
    }

    pub fn is_active(&self, region: Region) -> bool {
        self.active.contains(&region)
    }

    pub fn input(&self, input: FormInput) -> &str {
        self.inputs.get(&input).map(String::as_str).unwrap_or("")
    }

    /// Plain-text rendering of what a user would currently see.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if self.is_active(Region::ErrorBanner) {
            let _ = writeln!(out, "{}", self.text(TextSlot::ErrorBanner));
        }
        if self.is_active(Region::SuccessBanner) {
            let _ = writeln!(out, "{}", self.text(TextSlot::SuccessBanner));
        }
        if !self.is_active(Region::ResultsPanel) || !self.is_active(Region::ResultsContent) {
            return out;
        }

        out.push('\n');
        for slot in TextSlot::OUTPUT_FIELDS {
            let value = self.text(slot);
            if value.is_empty() {
                continue;
            }
            let marker = if slot == TextSlot::PriceChange && self.is_active(Region::NegativeChange)
            {
                " (negative)"
            } else {
                ""
            };
            let _ = writeln!(out, "{:<12} {}{}", slot.element_id(), value, marker);
        }
        if let Some(summary) = &self.summary {
            out.push('\n');
            out.push_str(&summary.render_text());
        }
        out
    }
}

impl InMemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(ticker: &str, start_date: &str, end_date: &str) -> Self {
        let page = Self::new();
        page.set_input_value(FormInput::Ticker, ticker);
        page.set_input_value(FormInput::StartDate, start_date);
        page.set_input_value(FormInput::EndDate, end_date);
        page
    }

    pub fn snapshot(&self) -> PageSnapshot {
        if let Ok(data) = self.inner.lock() {
            PageSnapshot {
                inputs: data.inputs.clone(),
                texts: data.texts.clone(),
                active: data.active.clone(),
                image_source: data.image_source.clone(),
                summary: data.summary.clone(),
            }
        } else {
            PageSnapshot::default()
        }
    }
}

impl PredictionView for InMemoryPage {
    fn input_value(&self, input: FormInput) -> String {
        self.inner
            .lock()
            .ok()
            .and_then(|data| data.inputs.get(&input).cloned())
            .unwrap_or_default()
    }

    fn set_input_value(&self, input: FormInput, value: &str) {
        if let Ok(mut data) = self.inner.lock() {
            data.inputs.insert(input, value.to_string());
        }
    }

    fn set_text(&self, slot: TextSlot, text: &str) {
        if let Ok(mut data) = self.inner.lock() {
            data.texts.insert(slot, text.to_string());
        }
    }

    fn set_active(&self, region: Region, active: bool) {
        if let Ok(mut data) = self.inner.lock() {
            if active {
                data.active.insert(region);
            } else {
                data.active.remove(&region);
            }
        }
    }

    fn set_image_source(&self, source: &str) {
        if let Ok(mut data) = self.inner.lock() {
            data.image_source = Some(source.to_string());
        }
    }

    fn set_summary(&self, summary: &SummaryBlock) {
        if let Ok(mut data) = self.inner.lock() {
            data.summary = Some(summary.clone());
        }
    }
}
