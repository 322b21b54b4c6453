//! Decide which notifications a state change should fire.
//!
//! Every trigger is derived from a transition that can only happen
//! once: a participant key going from absent to present, or a
//! remindee's `responded` flag going from false to true. Repeating the
//! same call finds the transition already taken and yields nothing.

use super::models::{Attendee, Event, Remindee, TaskHandle, UserId};
use super::responses::{PutOutcome, Respondent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Tell the owner someone responded to their poll for the first time
    FirstResponse {
        owner_id: UserId,
        respondent: Respondent,
    },
    /// Tell the owner every remindee has responded
    EveryoneResponded { owner_id: UserId },
}

/// Evaluate the first-response trigger for a write whose outcome was
/// determined atomically by the store, so the "did this key exist"
/// check always reflects the state right before the merge.
pub fn first_response(
    event: &Event,
    respondent: &Respondent,
    outcome: PutOutcome,
) -> Option<Trigger> {
    if !event.event_type.has_remindees() || !event.notifications_enabled() {
        return None;
    }
    if outcome.had_prior() {
        return None;
    }
    let owner_id = event.owner_id.as_ref()?;
    if respondent.participant_key() == owner_id.as_str() {
        return None;
    }
    Some(Trigger::FirstResponse {
        owner_id: owner_id.clone(),
        respondent: respondent.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkResponded {
    NotFound,
    /// Nothing changed, nothing should be written or sent
    AlreadyResponded,
    Marked {
        /// Reminder tasks that no longer need to run
        cancel: Vec<TaskHandle>,
        everyone_responded: bool,
    },
}

pub fn everyone_responded(remindees: &[Remindee]) -> bool {
    !remindees.is_empty() && remindees.iter().all(|r| r.responded)
}

/// Flip the remindee with `email` to responded. Short-circuits when
/// they already responded so the all-responded scan never runs twice
/// for the same remindee.
pub fn mark_remindee_responded(remindees: &mut [Remindee], email: &str) -> MarkResponded {
    let Some(remindee) = remindees.iter_mut().find(|r| r.email == email) else {
        return MarkResponded::NotFound;
    };
    if remindee.responded {
        return MarkResponded::AlreadyResponded;
    }
    remindee.responded = true;
    let cancel = remindee.task_ids.clone();

    MarkResponded::Marked {
        cancel,
        everyone_responded: everyone_responded(remindees),
    }
}

pub fn all_responded(event: &Event, outcome: &MarkResponded) -> Option<Trigger> {
    match outcome {
        MarkResponded::Marked {
            everyone_responded: true,
            ..
        } => event
            .owner_id
            .as_ref()
            .map(|owner_id| Trigger::EveryoneResponded {
                owner_id: owner_id.clone(),
            }),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decline {
    NotFound,
    AlreadyDeclined,
    Declined,
}

/// Declining is terminal. A repeat decline is reported so the caller
/// can skip the write.
pub fn decline_attendee(attendees: &mut [Attendee], email: &str) -> Decline {
    let Some(attendee) = attendees.iter_mut().find(|a| a.email == email) else {
        return Decline::NotFound;
    };
    if attendee.declined {
        return Decline::AlreadyDeclined;
    }
    attendee.declined = true;
    Decline::Declined
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::events::models::{EventId, EventType};

    fn poll(owner: Option<&str>, notifications: Option<bool>) -> Event {
        Event {
            id: EventId::from("e1"),
            owner_id: owner.map(UserId::from),
            name: String::from("Offsite"),
            duration_minutes: 60,
            event_type: EventType::SpecificDates,
            dates: vec![],
            notifications_enabled: notifications,
            responses: BTreeMap::new(),
            remindees: None,
            attendees: None,
        }
    }

    fn guest(name: &str) -> Respondent {
        Respondent::Guest {
            name: name.to_string(),
        }
    }

    #[test]
    fn it_fires_first_response_once_per_participant() {
        let event = poll(Some("owner"), Some(true));
        let first = first_response(&event, &guest("Sam"), PutOutcome::Inserted);
        let again = first_response(&event, &guest("Sam"), PutOutcome::Replaced);

        assert_eq!(
            first,
            Some(Trigger::FirstResponse {
                owner_id: UserId::from("owner"),
                respondent: guest("Sam"),
            })
        );
        assert_eq!(again, None);
    }

    #[test]
    fn it_skips_first_response_when_disabled_or_ownerless() {
        for notifications in [None, Some(false)] {
            let event = poll(Some("owner"), notifications);
            assert_eq!(
                first_response(&event, &guest("Sam"), PutOutcome::Inserted),
                None
            );
        }
        let event = poll(None, Some(true));
        assert_eq!(
            first_response(&event, &guest("Sam"), PutOutcome::Inserted),
            None
        );
    }

    #[test]
    fn it_skips_first_response_from_the_owner() {
        let event = poll(Some("owner"), Some(true));
        let owner = Respondent::User {
            id: UserId::from("owner"),
        };
        assert_eq!(first_response(&event, &owner, PutOutcome::Inserted), None);
    }

    #[test]
    fn it_skips_first_response_for_groups() {
        let mut event = poll(Some("owner"), Some(true));
        event.event_type = EventType::Group;
        assert_eq!(
            first_response(&event, &guest("Sam"), PutOutcome::Inserted),
            None
        );
    }

    #[test]
    fn it_fires_everyone_responded_exactly_once() {
        let mut event = poll(Some("owner"), None);
        let mut remindees = vec![
            Remindee {
                email: String::from("a"),
                task_ids: vec![String::from("t1")],
                responded: false,
            },
            Remindee {
                email: String::from("b"),
                task_ids: vec![],
                responded: true,
            },
        ];

        let first = mark_remindee_responded(&mut remindees, "a");
        assert_eq!(
            first,
            MarkResponded::Marked {
                cancel: vec![String::from("t1")],
                everyone_responded: true,
            }
        );
        event.remindees = Some(remindees.clone());
        assert_eq!(
            all_responded(&event, &first),
            Some(Trigger::EveryoneResponded {
                owner_id: UserId::from("owner")
            })
        );

        let second = mark_remindee_responded(&mut remindees, "a");
        assert_eq!(second, MarkResponded::AlreadyResponded);
        assert_eq!(all_responded(&event, &second), None);
    }

    #[test]
    fn it_waits_for_the_remaining_remindees() {
        let mut remindees = vec![Remindee::new("a"), Remindee::new("b")];
        let outcome = mark_remindee_responded(&mut remindees, "a");
        assert_eq!(
            outcome,
            MarkResponded::Marked {
                cancel: vec![],
                everyone_responded: false,
            }
        );
        assert_eq!(all_responded(&poll(Some("owner"), None), &outcome), None);
    }

    #[test]
    fn it_reports_unknown_remindees() {
        let mut remindees = vec![Remindee::new("a")];
        assert_eq!(
            mark_remindee_responded(&mut remindees, "z"),
            MarkResponded::NotFound
        );
        assert!(!remindees[0].responded);
    }

    #[test]
    fn it_declines_once() {
        let mut attendees = vec![Attendee::new("a"), Attendee::new("b")];
        assert_eq!(decline_attendee(&mut attendees, "b"), Decline::Declined);
        assert!(attendees[1].declined);
        assert_eq!(
            decline_attendee(&mut attendees, "b"),
            Decline::AlreadyDeclined
        );
        assert_eq!(decline_attendee(&mut attendees, "c"), Decline::NotFound);
        assert!(!attendees[0].declined);
    }
}
