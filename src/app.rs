//! The emergency workflow app core.
//!
//! `update` is the single serialization point for every transition: ticks,
//! rider intents, and capability completions all arrive here as events, so
//! the incident state machine never sees concurrent mutation. The shell's
//! scheduler drives the countdown by delivering `CountdownTick` events;
//! remaining time is recomputed from wall clock inside the incident, so the
//! cadence of those ticks only affects display granularity.

use tracing::{info, warn};

use crate::capabilities::Capabilities;
use crate::contact::{escalation_order, Contact};
use crate::event::{ContactId, Event, UnixTimeMs};
use crate::incident::{
    AttemptKind, AttemptOutcome, CountdownConfig, EscalationAttempt, Incident, IncidentStatus,
    Tick,
};
use crate::model::{DirectoryState, InFlightAttempt, Model};
use crate::view::{AttemptView, ContactView, LocationView, UserFacingError, ViewModel, ViewState};
use crate::{DISPATCH_TIMEOUT_MS, SNAPSHOT_TIMEOUT_MS};

#[derive(Default)]
pub struct App;

/// What the automatic sequence should do next, decided from immutable state
/// before any mutation happens.
enum EscalationStep {
    Wait,
    Finish,
    Dispatch(Contact),
}

impl App {
    fn create_incident(
        model: &mut Model,
        caps: &Capabilities,
        at: UnixTimeMs,
        trigger: crate::incident::IncidentTrigger,
    ) {
        let config = match CountdownConfig::new(model.countdown_seconds, model.stop_on_first_success)
        {
            Ok(config) => config,
            Err(e) => {
                // Never silently defaulted: surface and refuse to create.
                warn!(error = %e, "refusing to create incident with invalid config");
                model.active_error = Some(e.into());
                return;
            }
        };

        model.active_error = None;
        model.in_flight.clear();

        let mut incident = Incident::create(at, trigger, config);
        incident.begin_countdown();
        let incident_id = incident.id();
        info!(
            incident_id = %incident_id,
            duration_seconds = config.duration_seconds(),
            "incident created, countdown started"
        );
        model.incident = Some(incident);

        // Best-effort, bounded: the incident never waits on either of these.
        // The snapshot response is stamped with the incident id so a fix
        // arriving after this incident resolves cannot bind to a later one.
        model.directory = DirectoryState::Loading;
        caps.location.snapshot(SNAPSHOT_TIMEOUT_MS, move |result| {
            Event::SnapshotResolved {
                incident_id,
                result: Box::new(result),
            }
        });
        caps.directory
            .load(|result| Event::DirectoryResolved(Box::new(result)));

        // A zero-length window escalates at the moment of detection.
        Self::advance_countdown(model, caps, at);
    }

    fn advance_countdown(model: &mut Model, caps: &Capabilities, now: UnixTimeMs) {
        let expired = match model.incident.as_mut() {
            Some(incident) => incident.tick(now) == Tick::Expired,
            None => false,
        };
        if expired {
            info!("countdown expired, escalation begins");
            Self::pump_escalation(model, caps);
        }
    }

    /// Drive the automatic sequence forward: dispatch the next contact in
    /// priority order, or close the incident out once the list is exhausted.
    /// Strictly sequential — never more than one escalation dispatch in
    /// flight — and a no-op once the rider has cancelled.
    fn pump_escalation(model: &mut Model, caps: &Capabilities) {
        let step = {
            let Some(incident) = model.incident.as_ref() else {
                return;
            };
            if incident.status() != IncidentStatus::Escalating {
                return;
            }
            if model.has_in_flight_escalation() {
                EscalationStep::Wait
            } else {
                match &model.directory {
                    // Directory still loading; resume when it resolves.
                    DirectoryState::NotLoaded | DirectoryState::Loading => EscalationStep::Wait,
                    // Nothing can be attempted: exhausted vacuously.
                    DirectoryState::Failed(_) => EscalationStep::Finish,
                    DirectoryState::Loaded(contacts) => {
                        if incident.config().stop_on_first_success
                            && incident.any_escalation_delivered()
                        {
                            EscalationStep::Finish
                        } else {
                            contacts
                                .iter()
                                .find(|c| {
                                    !incident.attempted_escalations().any(|id| id == &c.id)
                                })
                                .map_or(EscalationStep::Finish, |c| {
                                    EscalationStep::Dispatch(c.clone())
                                })
                        }
                    }
                }
            }
        };

        match step {
            EscalationStep::Wait => {}
            EscalationStep::Finish => {
                if let Some(incident) = model.incident.as_mut() {
                    incident.finish_escalation();
                    info!(status = ?incident.status(), "escalation sequence finished");
                }
            }
            EscalationStep::Dispatch(contact) => {
                info!(contact = %contact.display_name, "dispatching escalation attempt");
                model.track_in_flight(InFlightAttempt {
                    contact_id: contact.id.clone(),
                    kind: AttemptKind::Escalation,
                    attempted_at: model.clock,
                });
                let contact_id = contact.id.clone();
                caps.dispatch.notify(
                    contact.id,
                    contact.address,
                    DISPATCH_TIMEOUT_MS,
                    move |result| Event::AttemptResolved {
                        contact_id,
                        kind: AttemptKind::Escalation,
                        result: Box::new(result),
                    },
                );
            }
        }
    }

    /// Rider-initiated call to one specific contact, bypassing escalation
    /// ordering. Logged with the manual marker; never changes status.
    fn dispatch_manual(model: &mut Model, caps: &Capabilities, contact_id: &ContactId) {
        let live = model
            .incident
            .as_ref()
            .is_some_and(|i| !i.status().is_terminal());
        if !live {
            warn!(contact = %contact_id, "manual call without a live incident, ignoring");
            return;
        }
        let Some(contact) = model.find_contact(contact_id).cloned() else {
            warn!(contact = %contact_id, "manual call for unknown contact, ignoring");
            return;
        };

        info!(contact = %contact.display_name, "manual call requested");
        model.track_in_flight(InFlightAttempt {
            contact_id: contact.id.clone(),
            kind: AttemptKind::Manual,
            attempted_at: model.clock,
        });
        let event_contact_id = contact.id.clone();
        caps.dispatch.notify(
            contact.id,
            contact.address,
            DISPATCH_TIMEOUT_MS,
            move |result| Event::AttemptResolved {
                contact_id: event_contact_id,
                kind: AttemptKind::Manual,
                result: Box::new(result),
            },
        );
    }

    fn record_completion(
        model: &mut Model,
        caps: &Capabilities,
        contact_id: ContactId,
        kind: AttemptKind,
        outcome: AttemptOutcome,
    ) {
        // Only completions we actually dispatched are recorded; anything
        // else is a stale response from a previous incident.
        let Some(in_flight) = model.take_in_flight(&contact_id, kind) else {
            warn!(contact = %contact_id, "completion for unknown dispatch, dropping");
            return;
        };

        if let Some(incident) = model.incident.as_mut() {
            // Appended even when the rider cancelled while this attempt was
            // in flight: the log stays a complete audit of what was tried.
            incident.record_attempt(EscalationAttempt {
                contact_id,
                attempted_at: in_flight.attempted_at,
                outcome,
                kind,
            });
        }

        if kind == AttemptKind::Escalation {
            Self::pump_escalation(model, caps);
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::SettingsChanged {
                countdown_seconds,
                stop_on_first_success,
            } => {
                model.countdown_seconds = countdown_seconds;
                model.stop_on_first_success = stop_on_first_success;
            }

            Event::IncidentDetected { at, trigger } => {
                model.observe_time(at);
                let live = model
                    .incident
                    .as_ref()
                    .is_some_and(|i| !i.status().is_terminal());
                if live {
                    // One logical owner per incident; a fresh one only
                    // starts after the current one resolves.
                    warn!("detection while an incident is live, ignoring");
                } else {
                    Self::create_incident(model, caps, at, trigger);
                }
            }

            Event::CountdownTick { now } => {
                model.observe_time(now);
                Self::advance_countdown(model, caps, model.clock);
            }

            Event::MarkSafeRequested => {
                if let Some(incident) = model.incident.as_mut() {
                    if incident.mark_safe() {
                        info!(incident_id = %incident.id(), "rider marked safe");
                    }
                }
                // Duplicate taps and taps with no incident are no-ops.
            }

            Event::ManualCallRequested { contact_id } => {
                Self::dispatch_manual(model, caps, &contact_id);
            }

            Event::SnapshotResolved {
                incident_id,
                result,
            } => match *result {
                Ok(position) => match model.incident.as_mut() {
                    Some(incident) if incident.id() == incident_id => {
                        incident.capture_snapshot(position);
                    }
                    _ => {
                        // Stale fix from an incident that already resolved.
                        warn!(%incident_id, "snapshot for a different incident, dropping");
                    }
                },
                Err(e) => {
                    // Degraded mode: the incident simply has no location.
                    warn!(error = %e, "location snapshot unavailable");
                }
            },

            Event::DirectoryResolved(result) => match *result {
                Ok(contacts) => {
                    model.directory = DirectoryState::Loaded(escalation_order(contacts));
                    Self::pump_escalation(model, caps);
                }
                Err(e) => {
                    warn!(error = %e, "contact directory unavailable");
                    model.directory = DirectoryState::Failed(e.clone());
                    model.active_error = Some(e.into());
                    Self::pump_escalation(model, caps);
                }
            },

            Event::AttemptResolved {
                contact_id,
                kind,
                result,
            } => {
                let outcome = match *result {
                    Ok(report) if report.delivered => AttemptOutcome::Delivered,
                    Ok(report) => AttemptOutcome::Failed {
                        reason: report
                            .failure_reason
                            .unwrap_or_else(|| "undelivered".to_string()),
                    },
                    // Environment faults become failed attempts; the
                    // sequence keeps going.
                    Err(e) => AttemptOutcome::Failed {
                        reason: e.to_string(),
                    },
                };
                Self::record_completion(model, caps, contact_id, kind, outcome);
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let state = match &model.incident {
            None => ViewState::Idle,
            Some(incident) => {
                let attempts: Vec<AttemptView> =
                    incident.escalation_log().iter().map(AttemptView::from).collect();
                let location = incident.location_snapshot().map(LocationView::from);
                let contacts: Vec<ContactView> = model
                    .directory
                    .contacts()
                    .iter()
                    .map(ContactView::from)
                    .collect();

                match incident.status() {
                    IncidentStatus::Pending | IncidentStatus::CountingDown => {
                        ViewState::CountingDown {
                            remaining_seconds: incident.remaining_seconds(model.clock),
                            trigger: incident.trigger(),
                            location,
                            contacts,
                            attempts,
                        }
                    }
                    IncidentStatus::Escalating => ViewState::Escalating {
                        trigger: incident.trigger(),
                        location,
                        contacts,
                        attempts,
                    },
                    IncidentStatus::Resolved(resolution) => ViewState::Resolved {
                        resolution,
                        location,
                        attempts,
                    },
                }
            }
        };

        ViewModel {
            state,
            error: model.active_error.as_ref().map(UserFacingError::from),
        }
    }
}
