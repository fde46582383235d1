use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

use super::client::{SimulationService, SubmitError};
use crate::core::{
    ChartSpec, RenderedSummary, ScenarioResult, build_chart, build_request, render_summary,
};

/// Everything a front end needs to show one simulation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub summary: RenderedSummary,
    pub chart: ChartSpec,
}

impl Presentation {
    pub fn from_result(result: &ScenarioResult) -> Self {
        Self {
            summary: render_summary(result),
            chart: build_chart(result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ViewState {
    Idle,
    Pending,
    Ready(Presentation),
    Failed { message: String },
}

/// A display surface. Receives every state the current slot moves through.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &ViewState);
}

/// Builds the request, calls the service and renders the answer.
pub async fn present_scenario<S>(
    service: &S,
    raw: &HashMap<String, String>,
) -> Result<Presentation, SubmitError>
where
    S: SimulationService + ?Sized,
{
    let request = build_request(raw)?;
    let result = service.run_simulation(&request).await?;
    Ok(Presentation::from_result(&result))
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission was still the latest one and its view was rendered.
    Rendered(ViewState),
    /// A newer submission was issued while this one was in flight.
    Superseded,
}

#[derive(Debug)]
struct Slot {
    ticket: u64,
    view: ViewState,
}

/// Single-slot submission handling: only the most recent submission may
/// update the view, whatever order the responses arrive in.
pub struct SubmissionController<S, R> {
    service: S,
    renderer: R,
    slot: Mutex<Slot>,
}

impl<S, R> SubmissionController<S, R>
where
    S: SimulationService,
    R: Renderer,
{
    pub fn new(service: S, renderer: R) -> Self {
        Self {
            service,
            renderer,
            slot: Mutex::new(Slot {
                ticket: 0,
                view: ViewState::Idle,
            }),
        }
    }

    pub fn current(&self) -> ViewState {
        self.lock_slot().view.clone()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Submission handler to wire to the form's submit event.
    pub async fn submit(&self, raw: &HashMap<String, String>) -> SubmitOutcome {
        let ticket = {
            let mut slot = self.lock_slot();
            slot.ticket += 1;
            slot.view = ViewState::Pending;
            self.renderer.render(&slot.view);
            slot.ticket
        };

        let outcome = present_scenario(&self.service, raw).await;

        let mut slot = self.lock_slot();
        if slot.ticket != ticket {
            tracing::debug!(ticket, latest = slot.ticket, "dropping superseded response");
            return SubmitOutcome::Superseded;
        }

        slot.view = match outcome {
            Ok(presentation) => ViewState::Ready(presentation),
            Err(err) => {
                tracing::warn!(ticket, error = %err, "scenario submission failed");
                ViewState::Failed {
                    message: err.user_message().to_string(),
                }
            }
        };
        self.renderer.render(&slot.view);
        SubmitOutcome::Rendered(slot.view.clone())
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
