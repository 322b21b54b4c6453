//! Merge a submitted list of emails into an event's remindees or
//! attendees.
//!
//! Nothing here performs I/O. Scheduling, cancelling, and inviting are
//! returned as `SideEffect`s for the caller to carry out.

use super::diff::diff;
use super::models::{Attendee, EventId, Remindee, TaskHandle};

/// Event details needed to address side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileContext {
    pub owner_name: String,
    pub event_name: String,
    pub event_id: EventId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Schedule reminder emails and store the returned handles on the
    /// remindee with this email
    ScheduleReminder {
        email: String,
        owner_name: String,
        event_name: String,
        event_id: EventId,
    },
    CancelReminder {
        email: String,
        handles: Vec<TaskHandle>,
    },
    SendInvite {
        email: String,
        owner_name: String,
        group_name: String,
        event_id: EventId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<T> {
    pub list: Vec<T>,
    pub effects: Vec<SideEffect>,
}

pub fn reconcile_remindees(
    old: &[Remindee],
    new_emails: &[String],
    ctx: &ReconcileContext,
) -> Reconciled<Remindee> {
    let old_emails: Vec<&str> = old.iter().map(|r| r.email.as_str()).collect();
    let result = diff(&old_emails, new_emails);

    let mut list = Vec::with_capacity(result.kept.len() + result.added.len());
    let mut effects = Vec::new();

    for kept in &result.kept {
        list.push(old[kept.index].clone());
    }

    for added in &result.added {
        list.push(Remindee::new(&added.value));
        effects.push(SideEffect::ScheduleReminder {
            email: added.value.clone(),
            owner_name: ctx.owner_name.clone(),
            event_name: ctx.event_name.clone(),
            event_id: ctx.event_id.clone(),
        });
    }

    for removed in &result.removed {
        let remindee = &old[removed.index];
        effects.push(SideEffect::CancelReminder {
            email: remindee.email.clone(),
            handles: remindee.task_ids.clone(),
        });
    }

    Reconciled { list, effects }
}

pub fn reconcile_attendees(
    old: &[Attendee],
    new_emails: &[String],
    ctx: &ReconcileContext,
) -> Reconciled<Attendee> {
    let old_emails: Vec<&str> = old.iter().map(|a| a.email.as_str()).collect();
    let result = diff(&old_emails, new_emails);

    let mut list = Vec::with_capacity(result.kept.len() + result.added.len());
    let mut effects = Vec::new();

    for kept in &result.kept {
        list.push(old[kept.index].clone());
    }

    // Removed attendees are dropped without notice
    for added in &result.added {
        list.push(Attendee::new(&added.value));
        effects.push(SideEffect::SendInvite {
            email: added.value.clone(),
            owner_name: ctx.owner_name.clone(),
            group_name: ctx.event_name.clone(),
            event_id: ctx.event_id.clone(),
        });
    }

    Reconciled { list, effects }
}

/// What changed under a participant list between the read it was
/// reconciled against and the write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rebased {
    /// Handles no stored remindee references anymore
    pub orphaned_tasks: Vec<TaskHandle>,
    /// Submitted emails that were already on the stored list
    pub already_listed: Vec<String>,
}

/// Replace every entry of `list` that is also in `stored` with the
/// stored record, so flags and handles written since `list` was
/// reconciled survive. Handles that only `list` holds for such an
/// entry, and handles of stored entries missing from `list`, are
/// reported as orphaned.
pub fn rebase_remindees(stored: &[Remindee], list: &mut [Remindee]) -> Rebased {
    let mut rebased = Rebased::default();
    for remindee in list.iter_mut() {
        let Some(current) = stored.iter().find(|r| r.email == remindee.email) else {
            continue;
        };
        rebased.orphaned_tasks.extend(
            remindee
                .task_ids
                .iter()
                .filter(|handle| !current.task_ids.contains(handle))
                .cloned(),
        );
        rebased.already_listed.push(current.email.clone());
        *remindee = current.clone();
    }
    for current in stored {
        if !list.iter().any(|r| r.email == current.email) {
            rebased
                .orphaned_tasks
                .extend(current.task_ids.iter().cloned());
        }
    }
    rebased
}

/// Attendee counterpart of `rebase_remindees`.
pub fn rebase_attendees(stored: &[Attendee], list: &mut [Attendee]) -> Rebased {
    let mut rebased = Rebased::default();
    for attendee in list.iter_mut() {
        if let Some(current) = stored.iter().find(|a| a.email == attendee.email) {
            rebased.already_listed.push(current.email.clone());
            *attendee = current.clone();
        }
    }
    rebased
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ReconcileContext {
        ReconcileContext {
            owner_name: String::from("Ada"),
            event_name: String::from("Planning"),
            event_id: EventId::from("e1"),
        }
    }

    fn emails(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn remindee(email: &str, responded: bool, tasks: &[&str]) -> Remindee {
        Remindee {
            email: email.to_string(),
            task_ids: tasks.iter().map(|s| s.to_string()).collect(),
            responded,
        }
    }

    #[test]
    fn it_preserves_state_of_kept_remindees() {
        let old = vec![
            remindee("a@x.com", true, &["t1", "t2"]),
            remindee("b@x.com", false, &["t3"]),
        ];
        let result = reconcile_remindees(&old, &emails(&["b@x.com", "a@x.com"]), &ctx());

        assert_eq!(result.list, old);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn it_schedules_added_and_cancels_removed_remindees() {
        let old = vec![
            remindee("a@x.com", false, &["t1", "t2"]),
            remindee("b@x.com", true, &["t3"]),
        ];
        let result = reconcile_remindees(&old, &emails(&["c@x.com", "b@x.com"]), &ctx());

        // Kept first, then added in submitted order
        assert_eq!(
            result.list,
            vec![remindee("b@x.com", true, &["t3"]), Remindee::new("c@x.com")]
        );
        assert_eq!(
            result.effects,
            vec![
                SideEffect::ScheduleReminder {
                    email: String::from("c@x.com"),
                    owner_name: String::from("Ada"),
                    event_name: String::from("Planning"),
                    event_id: EventId::from("e1"),
                },
                SideEffect::CancelReminder {
                    email: String::from("a@x.com"),
                    handles: vec![String::from("t1"), String::from("t2")],
                },
            ]
        );
    }

    #[test]
    fn it_initializes_fresh_remindees_on_create() {
        let result = reconcile_remindees(&[], &emails(&["a@x.com", "b@x.com"]), &ctx());
        assert_eq!(
            result.list,
            vec![Remindee::new("a@x.com"), Remindee::new("b@x.com")]
        );
        assert_eq!(result.effects.len(), 2);
        assert!(
            result
                .effects
                .iter()
                .all(|e| matches!(e, SideEffect::ScheduleReminder { .. }))
        );
    }

    #[test]
    fn it_drops_duplicate_submitted_emails() {
        let result = reconcile_remindees(&[], &emails(&["a@x.com", "a@x.com"]), &ctx());
        assert_eq!(result.list, vec![Remindee::new("a@x.com")]);
        assert_eq!(result.effects.len(), 1);
    }

    #[test]
    fn it_invites_added_attendees_and_silently_drops_removed() {
        let old = vec![
            Attendee {
                email: String::from("a@x.com"),
                declined: true,
            },
            Attendee::new("b@x.com"),
        ];
        let result = reconcile_attendees(&old, &emails(&["a@x.com", "c@x.com"]), &ctx());

        assert_eq!(
            result.list,
            vec![
                Attendee {
                    email: String::from("a@x.com"),
                    declined: true,
                },
                Attendee::new("c@x.com"),
            ]
        );
        assert_eq!(
            result.effects,
            vec![SideEffect::SendInvite {
                email: String::from("c@x.com"),
                owner_name: String::from("Ada"),
                group_name: String::from("Planning"),
                event_id: EventId::from("e1"),
            }]
        );
    }

    #[test]
    fn it_empties_the_list_when_nothing_is_submitted() {
        let old = vec![remindee("a@x.com", false, &["t1"])];
        let result = reconcile_remindees(&old, &[], &ctx());
        assert!(result.list.is_empty());
        assert_eq!(
            result.effects,
            vec![SideEffect::CancelReminder {
                email: String::from("a@x.com"),
                handles: vec![String::from("t1")],
            }]
        );
    }

    #[test]
    fn it_keeps_stored_progress_when_rebasing() {
        // Read before a@x.com responded and before c@x.com was added
        // by someone else
        let stored = vec![
            remindee("a@x.com", true, &["t1"]),
            remindee("c@x.com", false, &["t9"]),
            remindee("d@x.com", false, &["t4"]),
        ];
        let mut list = vec![
            remindee("a@x.com", false, &["t1"]),
            remindee("c@x.com", false, &["t5"]),
            Remindee::new("e@x.com"),
        ];
        let rebased = rebase_remindees(&stored, &mut list);

        assert_eq!(
            list,
            vec![
                remindee("a@x.com", true, &["t1"]),
                remindee("c@x.com", false, &["t9"]),
                Remindee::new("e@x.com"),
            ]
        );
        assert_eq!(
            rebased.orphaned_tasks,
            vec![String::from("t5"), String::from("t4")]
        );
        assert_eq!(
            rebased.already_listed,
            vec![String::from("a@x.com"), String::from("c@x.com")]
        );
    }

    #[test]
    fn it_keeps_stored_declines_when_rebasing() {
        let stored = vec![Attendee {
            email: String::from("a@x.com"),
            declined: true,
        }];
        let mut list = vec![Attendee::new("a@x.com"), Attendee::new("b@x.com")];
        let rebased = rebase_attendees(&stored, &mut list);

        assert!(list[0].declined);
        assert!(!list[1].declined);
        assert_eq!(rebased.already_listed, vec![String::from("a@x.com")]);
        assert!(rebased.orphaned_tasks.is_empty());
    }
}
