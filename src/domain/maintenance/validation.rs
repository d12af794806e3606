//! Validation engine for the single-active-event rule.
//!
//! Pure logic: callers fetch the application's currently active events and
//! ask whether a projected write may proceed. The caller is responsible for
//! holding the application's write lock between this check and the commit.

use crate::domain::foundation::MaintenanceEventId;

use super::application::Application;
use super::errors::MaintenanceError;
use super::status::MaintenanceStatus;

/// Decides whether a write keeps at most one active event for `application`.
///
/// * `active` - ids of the application's events that are active right now
/// * `candidate_id` - the event being written, `None` when creating
/// * `candidate_status` - the status after the write; `None` means the
///   creation default, which is active
///
/// If the rule is already broken (more than one active event), every write is
/// refused except one that moves one of those active events out of the
/// active set, so that the breach can be cleaned up.
pub fn check_active_invariant(
    application: &Application,
    active: &[MaintenanceEventId],
    candidate_id: Option<MaintenanceEventId>,
    candidate_status: Option<MaintenanceStatus>,
) -> Result<(), MaintenanceError> {
    let candidate_active = candidate_status.unwrap_or_default().is_active();

    let conflict = match active {
        [] => false,
        [existing] => candidate_active && Some(*existing) != candidate_id,
        _ => {
            let corrective = !candidate_active
                && candidate_id.map_or(false, |id| active.contains(&id));
            !corrective
        }
    };

    if conflict {
        tracing::debug!(
            application = %application.name(),
            active_count = active.len(),
            candidate = ?candidate_id,
            "Rejected write that would break the single-active-event rule"
        );
        return Err(MaintenanceError::active_conflict(application.name()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ApplicationId;
    use crate::domain::maintenance::MaintenanceStatus::*;

    fn app() -> Application {
        Application {
            id: ApplicationId::new(1),
            slug: "perma".to_string(),
            tier: "prod".to_string(),
        }
    }

    fn id(n: i64) -> MaintenanceEventId {
        MaintenanceEventId::new(n)
    }

    #[test]
    fn create_with_no_active_events_is_allowed() {
        assert!(check_active_invariant(&app(), &[], None, Some(Imminent)).is_ok());
        assert!(check_active_invariant(&app(), &[], None, None).is_ok());
    }

    #[test]
    fn create_active_while_another_is_active_conflicts() {
        for status in [Some(Imminent), Some(InProgress), None] {
            let err = check_active_invariant(&app(), &[id(1)], None, status).unwrap_err();
            assert!(err.to_string().contains("perma prod"));
        }
    }

    #[test]
    fn create_inactive_while_another_is_active_is_allowed() {
        assert!(check_active_invariant(&app(), &[id(1)], None, Some(Completed)).is_ok());
        assert!(check_active_invariant(&app(), &[id(1)], None, Some(Canceled)).is_ok());
    }

    #[test]
    fn updating_the_active_event_itself_is_allowed() {
        assert!(check_active_invariant(&app(), &[id(1)], Some(id(1)), Some(InProgress)).is_ok());
        assert!(check_active_invariant(&app(), &[id(1)], Some(id(1)), Some(Completed)).is_ok());
    }

    #[test]
    fn activating_a_different_event_conflicts() {
        assert!(check_active_invariant(&app(), &[id(1)], Some(id(2)), Some(Imminent)).is_err());
    }

    #[test]
    fn broken_invariant_blocks_unrelated_writes() {
        let active = [id(1), id(2)];
        assert!(check_active_invariant(&app(), &active, None, Some(Completed)).is_err());
        assert!(check_active_invariant(&app(), &active, Some(id(3)), Some(Canceled)).is_err());
        assert!(check_active_invariant(&app(), &active, Some(id(1)), Some(InProgress)).is_err());
    }

    #[test]
    fn broken_invariant_allows_deactivating_an_offender() {
        let active = [id(1), id(2)];
        assert!(check_active_invariant(&app(), &active, Some(id(2)), Some(Canceled)).is_ok());
        assert!(check_active_invariant(&app(), &active, Some(id(1)), Some(Completed)).is_ok());
    }
}
