//! Property checks for the ordering rule and the wall-clock countdown.

use proptest::prelude::*;

use rideguard_core::contact::{escalation_order, Contact};
use rideguard_core::event::{ContactId, UnixTimeMs};
use rideguard_core::incident::{
    CountdownConfig, Incident, IncidentStatus, IncidentTrigger, Resolution, Tick,
};

fn arb_contact(index: usize) -> impl Strategy<Value = Contact> {
    (0u32..10).prop_map(move |priority| Contact {
        id: ContactId::new(format!("c{index}")),
        display_name: format!("Contact {index}"),
        address: format!("+1 555 {index:04}"),
        priority,
    })
}

fn arb_directory() -> impl Strategy<Value = Vec<Contact>> {
    (0usize..12).prop_flat_map(|len| {
        let contacts: Vec<_> = (0..len).map(arb_contact).collect();
        contacts
    })
}

fn counting_incident(t0: u64, duration_seconds: u32) -> Incident {
    let config = CountdownConfig::new(i64::from(duration_seconds), false)
        .expect("non-negative duration");
    let mut incident = Incident::create(UnixTimeMs(t0), IncidentTrigger::Detected, config);
    incident.begin_countdown();
    incident
}

proptest! {
    #[test]
    fn escalation_order_is_a_permutation(directory in arb_directory()) {
        let ordered = escalation_order(directory.clone());

        prop_assert_eq!(ordered.len(), directory.len());
        for contact in &directory {
            prop_assert!(ordered.contains(contact));
        }
    }

    #[test]
    fn escalation_order_is_sorted_and_stable(directory in arb_directory()) {
        let ordered = escalation_order(directory.clone());

        for pair in ordered.windows(2) {
            prop_assert!(pair[0].priority <= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                // Equal priorities keep their relative input order.
                let first = directory.iter().position(|c| c.id == pair[0].id);
                let second = directory.iter().position(|c| c.id == pair[1].id);
                prop_assert!(first < second);
            }
        }
    }

    #[test]
    fn countdown_never_expires_early(
        t0 in 0u64..1_000_000,
        duration_seconds in 0u32..3_600,
        offsets in proptest::collection::vec(0u64..10_000_000, 0..20),
    ) {
        let mut incident = counting_incident(t0, duration_seconds);
        let deadline = incident.deadline();
        let mut expiries = 0u32;

        // Ticks arrive in arbitrary order, possibly duplicated or late.
        for offset in offsets {
            let now = UnixTimeMs(t0.saturating_add(offset));
            match incident.tick(now) {
                Tick::Expired => {
                    prop_assert!(now >= deadline);
                    expiries += 1;
                }
                Tick::Counting { remaining_seconds } => {
                    prop_assert!(now < deadline);
                    prop_assert!(remaining_seconds > 0);
                    prop_assert!(remaining_seconds <= duration_seconds);
                }
                Tick::Ignored => {
                    prop_assert!(incident.status() != IncidentStatus::CountingDown);
                }
            }
        }

        // The transition out of the countdown fires at most once.
        prop_assert!(expiries <= 1);
    }

    #[test]
    fn mark_safe_wins_against_any_tick_sequence(
        t0 in 0u64..1_000_000,
        duration_seconds in 0u32..3_600,
        before in proptest::collection::vec(0u64..10_000_000, 0..10),
        after in proptest::collection::vec(0u64..10_000_000, 0..10),
    ) {
        let mut incident = counting_incident(t0, duration_seconds);
        for offset in before {
            incident.tick(UnixTimeMs(t0.saturating_add(offset)));
        }
        incident.mark_safe();

        // Cancellation wins whether the window was still open or escalation
        // had already begun.
        prop_assert_eq!(
            incident.status(),
            IncidentStatus::Resolved(Resolution::Cancelled)
        );

        let settled = incident.status();
        for offset in after {
            prop_assert_eq!(
                incident.tick(UnixTimeMs(t0.saturating_add(offset))),
                Tick::Ignored
            );
        }
        prop_assert_eq!(incident.status(), settled);
    }
}
