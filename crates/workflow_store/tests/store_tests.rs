//! Workflow store tests
//!
//! Timing tests run on a paused Tokio clock, so the 7/2/4/14 second sync
//! schedule completes instantly and deterministically.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio::time::sleep;

use core_kernel::{ClaimId, FixedClock};
use domain_claims::ports::mock::MockEhrPort;
use domain_claims::{status, Stage};
use test_utils::{
    assert_all_approved, assert_approvals, assert_stage_status, index_set_strategy, suggestion_list_strategy, ClaimBuilder,
    ClaimFixtures, TemporalFixtures,
};
use workflow_store::{
    reduce, Action, Intent, ReduceContext, SeedData, StoreError, WorkflowConfig, WorkflowEvent,
    WorkflowState, WorkflowStore,
};

fn id(n: u64) -> ClaimId {
    ClaimId::new(n)
}

fn demo_store() -> WorkflowStore {
    WorkflowStore::builder()
        .seed(SeedData::demo().unwrap())
        .clock(Arc::new(FixedClock::new(TemporalFixtures::review_time())))
        .start()
        .unwrap()
}

/// Store with two local claims and an EHR offering one known and two new claims
fn small_store(ehr: Arc<MockEhrPort>) -> WorkflowStore {
    let seed = SeedData {
        claims: vec![ClaimFixtures::reviewed(1, 2), ClaimFixtures::analyzing(2)],
        ..SeedData::default()
    };
    WorkflowStore::builder()
        .seed(seed)
        .ehr(ehr)
        .clock(Arc::new(FixedClock::new(TemporalFixtures::review_time())))
        .start()
        .unwrap()
}

fn small_ehr() -> Arc<MockEhrPort> {
    Arc::new(MockEhrPort::new(vec![
        ClaimBuilder::new(1).patient("Stale copy").build(),
        ClaimFixtures::ehr_offer(10),
        ClaimFixtures::ehr_offer(11),
    ]))
}

// ============================================================================
// Builder Tests
// ============================================================================

mod builder_tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_with_seed_and_idle_ui() {
        let store = demo_store();
        let state = store.snapshot();

        assert_eq!(state.claims.len(), 8);
        assert!(!state.is_syncing());
        assert!(state.ui.selected_claim.is_none());
        assert!(state.ui.selected_claim_ids.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_unknown_timezone() {
        let config = WorkflowConfig {
            timezone: "Mars/Olympus_Mons".into(),
            ..WorkflowConfig::default()
        };
        let result = WorkflowStore::builder().config(config).start();
        assert!(matches!(result, Err(StoreError::Timezone(_))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_seed_claim() {
        let seed = SeedData {
            claims: vec![ClaimBuilder::new(1).cpt_codes(&[]).build()],
            ..SeedData::default()
        };
        let result = WorkflowStore::builder().seed(seed).start();
        assert!(matches!(result, Err(StoreError::Seed(_))));
    }

    #[tokio::test]
    async fn test_closed_after_shutdown() {
        let store = demo_store();
        store.shutdown().await.unwrap();

        let result = store.set_active_tab(workflow_store::Tab::Claims).await;
        assert!(matches!(result, Err(StoreError::Closed)));
    }
}

// ============================================================================
// Approval Tests
// ============================================================================

mod approval_tests {
    use super::*;

    #[tokio::test]
    async fn test_approve_all_moves_claim_to_pending() {
        let store = demo_store();
        let state = store.approve_suggestions(id(1003), None, None).await.unwrap();

        let claim = state.claim(id(1003)).unwrap();
        assert_stage_status(claim, Stage::Pending, status::CHANGES_APPLIED);
        assert_all_approved(claim);
        assert_eq!(claim.approved_by.as_deref(), Some("Current User"));
        assert_eq!(claim.approved_at, Some(TemporalFixtures::review_time()));
        assert_eq!(
            claim.approved_at_label(store.timezone()).as_deref(),
            Some("3:45 PM")
        );
    }

    #[tokio::test]
    async fn test_partial_approval_stays_in_review() {
        let store = demo_store();
        let state = store
            .approve_suggestions(id(1004), Some(vec![0, 2]), Some("Priya Patel"))
            .await
            .unwrap();

        let claim = state.claim(id(1004)).unwrap();
        assert_stage_status(claim, Stage::AiReview, status::CHANGES_APPLIED);
        assert_eq!(claim.approved_by.as_deref(), Some("Priya Patel"));
        assert_approvals(claim, &[Some(true), None, Some(true)]);

        let state = store
            .approve_suggestions(id(1004), Some(vec![1]), Some("Priya Patel"))
            .await
            .unwrap();
        assert_eq!(state.claim(id(1004)).unwrap().stage, Stage::Pending);
    }

    #[tokio::test]
    async fn test_out_of_range_indices_skipped() {
        let store = demo_store();
        let state = store
            .approve_suggestions(id(1003), Some(vec![0, 99]), None)
            .await
            .unwrap();
        let claim = state.claim(id(1003)).unwrap();
        assert_eq!(claim.stage, Stage::AiReview);
        assert!(claim.suggestions()[0].is_approved());
    }

    #[tokio::test]
    async fn test_approval_without_suggestions_changes_nothing() {
        let store = demo_store();
        let before = store.snapshot();
        let after = store.approve_suggestions(id(1001), None, None).await.unwrap();
        assert_eq!(*before, *after);
    }

    #[tokio::test]
    async fn test_approval_of_unknown_claim_changes_nothing() {
        let store = demo_store();
        let before = store.snapshot();
        let after = store.approve_suggestions(id(9999), None, None).await.unwrap();
        assert_eq!(*before, *after);
    }

    #[tokio::test]
    async fn test_open_claim_refreshed_after_approval() {
        let store = demo_store();
        store.set_selected_claim(Some(id(1003))).await.unwrap();
        let state = store.approve_suggestions(id(1003), None, None).await.unwrap();

        assert_eq!(state.ui.selected_claim.as_ref(), state.claim(id(1003)));
    }

    #[tokio::test]
    async fn test_approval_event_published() {
        let store = demo_store();
        let mut events = store.subscribe_events();
        store.approve_suggestions(id(1003), None, Some("Priya Patel")).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            WorkflowEvent::SuggestionsApproved {
                claim_id: id(1003),
                approver: "Priya Patel".into(),
                applied: vec![0, 1],
                timestamp: TemporalFixtures::review_time(),
            }
        );
    }
}

// ============================================================================
// Sync Simulation Tests
// ============================================================================

mod sync_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sync_timeline() {
        let store = small_store(small_ehr());

        let state = store.sync_from_ehr().await.unwrap();
        assert!(state.is_syncing());
        assert_eq!(state.claims.len(), 2);

        sleep(Duration::from_millis(6500)).await;
        assert!(store.snapshot().is_syncing());
        assert_eq!(store.snapshot().claims.len(), 2);

        // +7: claims arrive
        sleep(Duration::from_millis(1000)).await;
        let state = store.snapshot();
        assert!(!state.is_syncing());
        assert_eq!(state.claim_ids(), vec![id(1), id(2), id(10), id(11)]);
        assert_ne!(state.claim(id(1)).unwrap().patient, "Stale copy");
        for claim_id in [id(10), id(11)] {
            let claim = state.claim(claim_id).unwrap();
            assert_stage_status(claim, Stage::New, status::SYNCING_FROM_EHR);
            assert_eq!(claim.time_in_stage, status::JUST_NOW);
            assert!(!claim.has_suggestions());
        }

        // +9: queued
        sleep(Duration::from_secs(2)).await;
        let state = store.snapshot();
        assert_stage_status(state.claim(id(10)).unwrap(), Stage::New, status::QUEUED_FOR_AI_REVIEW);

        // +11: analyzing
        sleep(Duration::from_secs(2)).await;
        let state = store.snapshot();
        assert_stage_status(state.claim(id(10)).unwrap(), Stage::AiReview, status::ANALYZING);
        assert!(!state.claim(id(10)).unwrap().has_suggestions());

        // +21: review complete, suggestions attached
        sleep(Duration::from_secs(10)).await;
        let state = store.snapshot();
        for claim_id in [id(10), id(11)] {
            let claim = state.claim(claim_id).unwrap();
            assert_stage_status(claim, Stage::AiReview, status::REVIEW_COMPLETE);
            assert_eq!(claim.suggestions().len(), 2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_sync_while_syncing_is_ignored() {
        let store = small_store(small_ehr());
        let mut events = store.subscribe_events();

        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(3)).await;
        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(30)).await;

        let state = store.snapshot();
        assert_eq!(state.claims.len(), 4);

        let mut started = 0;
        while let Ok(event) = events.try_recv() {
            if matches!(event, WorkflowEvent::SyncStarted { .. }) {
                started += 1;
            }
        }
        assert_eq!(started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resync_injects_only_new_claims() {
        let ehr = small_ehr();
        let store = small_store(ehr.clone());

        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(8)).await;
        assert_eq!(store.snapshot().claims.len(), 4);

        ehr.publish(ClaimFixtures::ehr_offer(12)).await;
        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(8)).await;

        let state = store.snapshot();
        assert_eq!(state.claim_ids(), vec![id(1), id(2), id(10), id(11), id(12)]);
        assert_eq!(state.claim(id(10)).unwrap().status, status::ANALYZING);
        assert_eq!(state.claim(id(12)).unwrap().status, status::SYNCING_FROM_EHR);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_ends_sync() {
        let ehr = small_ehr();
        ehr.set_unavailable(true);
        let store = small_store(ehr);
        let mut events = store.subscribe_events();

        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(8)).await;

        let state = store.snapshot();
        assert!(!state.is_syncing());
        assert_eq!(state.claims.len(), 2);

        assert!(matches!(events.recv().await.unwrap(), WorkflowEvent::SyncStarted { .. }));
        assert!(matches!(events.recv().await.unwrap(), WorkflowEvent::SyncFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_claim_phases_never_fire() {
        let store = small_store(small_ehr());
        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_millis(7500)).await;

        let mut events = store.subscribe_events();
        store.remove_claim(id(10)).await.unwrap();
        sleep(Duration::from_secs(20)).await;

        let state = store.snapshot();
        assert!(!state.contains_claim(id(10)));
        assert_eq!(state.claim(id(11)).unwrap().status, status::REVIEW_COMPLETE);

        let mut about_removed = Vec::new();
        while let Ok(event) = events.try_recv() {
            if event.claim_id() == Some(id(10)) {
                about_removed.push(event);
            }
        }
        assert_eq!(about_removed, vec![WorkflowEvent::ClaimRemoved { claim_id: id(10) }]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synced_claim_not_approvable_until_review_completes() {
        let store = small_store(small_ehr());
        store.sync_from_ehr().await.unwrap();

        sleep(Duration::from_millis(11_500)).await;
        let before = store.snapshot();
        let state = store.approve_suggestions(id(10), None, None).await.unwrap();
        assert_eq!(*before, *state);

        sleep(Duration::from_secs(10)).await;
        let state = store.approve_suggestions(id(10), Some(vec![0]), None).await.unwrap();
        let claim = state.claim(id(10)).unwrap();
        assert_stage_status(claim, Stage::AiReview, status::CHANGES_APPLIED);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(store.snapshot().claim(id(10)).unwrap().status, status::CHANGES_APPLIED);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_all_after_claim_list_grows() {
        let store = small_store(small_ehr());
        let before_sync = store.snapshot().claim_ids();
        let state = store.toggle_all_claims(before_sync.clone()).await.unwrap();
        assert_eq!(state.ui.selected_claim_ids.len(), 2);

        store.sync_from_ehr().await.unwrap();
        sleep(Duration::from_secs(8)).await;
        let grown = store.snapshot().claim_ids();
        assert_eq!(grown.len(), 4);

        // Full selection of the old set is not full for the grown set
        let state = store.toggle_all_claims(grown.clone()).await.unwrap();
        let expected: BTreeSet<ClaimId> = grown.iter().copied().collect();
        assert_eq!(state.ui.selected_claim_ids, expected);

        let state = store.toggle_all_claims(grown).await.unwrap();
        assert!(state.ui.selected_claim_ids.is_empty());

        let state = store.toggle_all_claims(before_sync).await.unwrap();
        assert_eq!(state.ui.selected_claim_ids, BTreeSet::from([id(1), id(2)]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_watch_sees_sync_progress() {
        let store = small_store(small_ehr());
        let mut snapshots = store.subscribe();

        store.sync_from_ehr().await.unwrap();
        snapshots.changed().await.unwrap();
        assert!(snapshots.borrow_and_update().is_syncing());

        sleep(Duration::from_secs(8)).await;
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().claims.len(), 4);
    }
}

// ============================================================================
// UI State Tests
// ============================================================================

mod ui_tests {
    use super::*;
    use workflow_store::{DetailTab, Tab, WorkflowView};

    #[tokio::test]
    async fn test_navigation_intents() {
        let store = demo_store();
        store.set_active_tab(Tab::Workflow).await.unwrap();
        store.set_workflow_view(WorkflowView::Table).await.unwrap();
        let state = store.toggle_row_expanded(id(1001)).await.unwrap();

        assert_eq!(state.ui.active_tab, Tab::Workflow);
        assert_eq!(state.ui.workflow_view, WorkflowView::Table);
        assert!(state.ui.expanded_rows.contains(&id(1001)));
    }

    #[tokio::test]
    async fn test_claim_and_task_selection() {
        let store = demo_store();
        let all_claims = store.snapshot().claim_ids();
        let all_tasks = store.snapshot().task_ids();

        let state = store.toggle_all_claims(all_claims.clone()).await.unwrap();
        assert_eq!(state.ui.selected_claim_ids.len(), all_claims.len());
        let state = store.toggle_claim_selection(id(1001)).await.unwrap();
        assert_eq!(state.ui.selected_claim_ids.len(), all_claims.len() - 1);
        let state = store.clear_claim_selection().await.unwrap();
        assert!(state.ui.selected_claim_ids.is_empty());

        let state = store.toggle_all_tasks(all_tasks.clone()).await.unwrap();
        assert_eq!(state.ui.selected_task_ids.len(), all_tasks.len());
        let state = store.toggle_all_tasks(all_tasks).await.unwrap();
        assert!(state.ui.selected_task_ids.is_empty());
    }

    #[tokio::test]
    async fn test_detail_panel_flow() {
        let store = demo_store();
        store.set_selected_claim(Some(id(1004))).await.unwrap();
        store.set_active_detail_tab(DetailTab::Suggestions).await.unwrap();
        let state = store
            .set_selected_suggestions(BTreeSet::from([0, 2]))
            .await
            .unwrap();
        assert_eq!(state.ui.selected_suggestions, BTreeSet::from([0, 2]));

        let state = store.set_selected_claim(None).await.unwrap();
        assert!(state.ui.selected_claim.is_none());
        assert_eq!(state.ui.active_detail_tab, DetailTab::Details);
        assert!(state.ui.selected_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_opening_another_claim_resets_panel() {
        let store = demo_store();
        store.set_selected_claim(Some(id(1004))).await.unwrap();
        store.set_active_detail_tab(DetailTab::History).await.unwrap();
        store.set_selected_suggestions(BTreeSet::from([1])).await.unwrap();
        store.dispatch(Intent::SetShowFullCms1500(true)).await.unwrap();

        let state = store.set_selected_claim(Some(id(1003))).await.unwrap();
        assert_eq!(state.ui.selected_claim.as_ref().map(|c| c.id), Some(id(1003)));
        assert_eq!(state.ui.active_detail_tab, DetailTab::Details);
        assert!(state.ui.selected_suggestions.is_empty());
        assert!(!state.ui.show_full_cms1500);
    }

    #[tokio::test]
    async fn test_update_selected_claim_leaves_list() {
        let store = demo_store();
        store.set_selected_claim(Some(id(1001))).await.unwrap();
        let mut edited = store.snapshot().claim(id(1001)).unwrap().clone();
        edited.patient = "Edited".into();

        let state = store.update_selected_claim(edited).await.unwrap();
        assert_eq!(state.ui.selected_claim.as_ref().unwrap().patient, "Edited");
        assert_ne!(state.claim(id(1001)).unwrap().patient, "Edited");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    fn apply(state: &mut WorkflowState, intent: Intent) {
        let ctx = ReduceContext {
            now: TemporalFixtures::review_time(),
            default_approver: "Current User",
        };
        reduce(state, Action::User(intent), &ctx);
    }

    fn reviewed_with(suggestions: Vec<domain_claims::AiSuggestion>) -> WorkflowState {
        let claim = ClaimBuilder::new(1)
            .stage(Stage::AiReview)
            .status(status::REVIEW_COMPLETE)
            .suggestions(suggestions)
            .build();
        WorkflowState::new(vec![claim], Vec::new(), Vec::new(), Vec::new())
    }

    proptest! {
        #[test]
        fn approval_keeps_open_claim_in_sync(
            (suggestions, indices) in suggestion_list_strategy(5)
                .prop_flat_map(|list| {
                    let len = list.len();
                    (Just(list), index_set_strategy(len))
                })
        ) {
            let mut state = reviewed_with(suggestions);
            apply(&mut state, Intent::SetSelectedClaim(Some(id(1))));
            apply(&mut state, Intent::ApproveSuggestions {
                claim_id: id(1),
                selection: domain_claims::SuggestionSelection::Indices(indices),
                approver: None,
            });

            let claim = state.claim(id(1)).unwrap();
            prop_assert_eq!(state.ui.selected_claim.as_ref(), Some(claim));
            prop_assert_eq!(claim.approved_by.as_deref(), Some("Current User"));
            prop_assert_eq!(claim.stage == Stage::Pending, claim.all_suggestions_approved());
        }

        #[test]
        fn toggle_claim_twice_is_identity(pick in 0usize..8) {
            let mut state = SeedData::demo().unwrap().initial_state();
            let target = state.claims[pick].id;
            let before = state.ui.selected_claim_ids.clone();

            apply(&mut state, Intent::ToggleClaimSelection(target));
            apply(&mut state, Intent::ToggleClaimSelection(target));
            prop_assert_eq!(state.ui.selected_claim_ids, before);
        }

        #[test]
        fn toggle_all_selects_then_clears(preselected in proptest::collection::btree_set(0usize..8, 0..8)) {
            let mut state = SeedData::demo().unwrap().initial_state();
            let all = state.claim_ids();
            for i in &preselected {
                apply(&mut state, Intent::ToggleClaimSelection(all[*i]));
            }

            apply(&mut state, Intent::ToggleAllClaims(all.clone()));
            let full: BTreeSet<ClaimId> = all.iter().copied().collect();
            if preselected.len() == all.len() {
                prop_assert!(state.ui.selected_claim_ids.is_empty());
            } else {
                prop_assert_eq!(&state.ui.selected_claim_ids, &full);
                apply(&mut state, Intent::ToggleAllClaims(all));
                prop_assert!(state.ui.selected_claim_ids.is_empty());
            }
        }
    }
}
