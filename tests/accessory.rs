// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for lock accessory reconciliation.
//!
//! Time is paused, so debounce windows and confirmation delays elapse as
//! soon as every task is idle.

mod common;

use std::sync::Arc;
use std::time::Duration;

use august_bridge::config::AccessorySettings;
use august_bridge::event::AccessoryEvent;
use august_bridge::state::AccessoryContext;
use august_bridge::subscription::Subscribable;
use august_bridge::types::{
    ContactSensorState, LockCurrentState, LockId, LockTargetState, SimpleState, StatusLowBattery,
};
use august_bridge::{Error, LockAccessory};
use common::{MockApi, door_only, lock_details, locked_closed, unlocked_open};
use tokio::time::sleep;

const ID: &str = "7EDFD6A4";

fn accessory(api: &Arc<MockApi>, settings: AccessorySettings) -> LockAccessory<MockApi> {
    let details = lock_details(ID, "Front Door");
    LockAccessory::new(
        Arc::clone(api),
        &details,
        settings,
        AccessoryContext::for_lock(LockId::new(ID)),
    )
}

fn transitions(events: &mut tokio::sync::broadcast::Receiver<AccessoryEvent>) -> Vec<&'static str> {
    let mut verbs = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let AccessoryEvent::TransitionLogged { verb, .. } = event {
            verbs.push(verb);
        }
    }
    verbs
}

// ============================================================================
// Poll reconciliation
// ============================================================================

mod poll {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn initial_refresh_reports_locked_and_closed() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());

        accessory.start().await;

        let state = accessory.state();
        assert_eq!(state.lock_current(), LockCurrentState::Secured);
        assert_eq!(state.lock_target(), LockTargetState::Secured);
        assert_eq!(state.contact(), ContactSensorState::Detected);
        assert_eq!(state.battery().value(), 80);
        assert_eq!(api.details_calls(), 1);
        assert!(accessory.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn unlocked_status_settles_target() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.set_status(ID, Some("kAugLockState_Unlocked"), Some("kAugDoorState_Open"));
        let accessory = accessory(&api, AccessorySettings::default());

        accessory.refresh().await.unwrap();

        let state = accessory.state();
        assert_eq!(state.lock_current(), LockCurrentState::Unsecured);
        assert_eq!(state.lock_target(), LockTargetState::Unsecured);
        assert_eq!(state.contact(), ContactSensorState::NotDetected);
    }

    #[tokio::test(start_paused = true)]
    async fn ambiguous_status_refetches_exactly_once() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.set_status(ID, None, Some("kAugDoorState_Closed"));
        let accessory = accessory(&api, AccessorySettings::default());

        accessory.refresh().await.unwrap();

        assert_eq!(api.details_calls(), 2);
        let state = accessory.state();
        assert_eq!(state.lock_current(), LockCurrentState::Unknown);
        // An unsettled bolt leaves the target alone.
        assert_eq!(state.lock_target(), LockTargetState::Secured);
    }

    #[tokio::test(start_paused = true)]
    async fn jammed_status_is_reported() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.set_status(ID, Some("kAugLockState_Jammed"), Some("kAugDoorState_Closed"));
        let accessory = accessory(&api, AccessorySettings::default());

        accessory.refresh().await.unwrap();

        assert_eq!(api.details_calls(), 1);
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Jammed);
    }

    #[tokio::test(start_paused = true)]
    async fn low_battery_threshold() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());

        api.set_battery(ID, 0.14);
        accessory.refresh().await.unwrap();
        assert_eq!(accessory.state().battery().value(), 14);
        assert_eq!(accessory.state().low_battery(), StatusLowBattery::Low);

        api.set_battery(ID, 0.15);
        accessory.refresh().await.unwrap();
        assert_eq!(accessory.state().battery().value(), 15);
        assert_eq!(accessory.state().low_battery(), StatusLowBattery::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_picks_up_remote_changes() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(
            &api,
            AccessorySettings::default().with_refresh_rate(Duration::from_secs(1)),
        );
        accessory.start().await;

        api.set_status(ID, Some("kAugLockState_Unlocked"), Some("kAugDoorState_Closed"));
        sleep(Duration::from_millis(1500)).await;

        assert_eq!(api.details_calls(), 2);
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Unsecured);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_refresh_rate_still_polls() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let mut settings = AccessorySettings::default();
        settings.refresh_rate = Duration::ZERO;
        let accessory = accessory(&api, settings);
        accessory.start().await;

        sleep(Duration::from_millis(2500)).await;

        assert!(accessory.is_running());
        assert_eq!(api.details_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_previous_state() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.fail_details_for(ID);
        let mut context = AccessoryContext::for_lock(LockId::new(ID));
        context.lock_current_state = Some(LockCurrentState::Unsecured);
        context.lock_target_state = Some(LockTargetState::Unsecured);
        let accessory = LockAccessory::new(
            Arc::clone(&api),
            &lock_details(ID, "Front Door"),
            AccessorySettings::default(),
            context,
        );

        accessory.start().await;

        assert!(accessory.is_running());
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Unsecured);
        assert!(matches!(
            accessory.refresh().await,
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn firmware_change_updates_information() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let mut context = AccessoryContext::for_lock(LockId::new(ID));
        context.firmware_version = Some("1.0.0".to_string());
        let accessory = LockAccessory::new(
            Arc::clone(&api),
            &lock_details(ID, "Front Door"),
            AccessorySettings::default(),
            context,
        );
        assert_eq!(accessory.info().firmware_revision.as_deref(), Some("1.0.0"));

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        accessory.on_firmware_changed(move |version| sink.lock().push(version.to_string()));

        accessory.start().await;

        assert_eq!(accessory.info().firmware_revision.as_deref(), Some("1.1.12"));
        assert_eq!(accessory.context().firmware_version.as_deref(), Some("1.1.12"));
        assert_eq!(*seen.lock(), vec!["1.1.12".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn callbacks_follow_state() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        accessory.on_lock_current_state_changed(move |state| sink.lock().push(state));
        let battery = Arc::new(parking_lot::Mutex::new(None));
        let battery_sink = Arc::clone(&battery);
        accessory.on_battery_changed(move |level, status| {
            *battery_sink.lock() = Some((level.value(), status));
        });

        accessory.start().await;
        api.set_status(ID, Some("kAugLockState_Unlocked"), Some("kAugDoorState_Closed"));
        accessory.refresh().await.unwrap();

        assert_eq!(seen.lock().last(), Some(&LockCurrentState::Unsecured));
        assert_eq!(*battery.lock(), Some((80, StatusLowBattery::Normal)));
    }

    #[tokio::test(start_paused = true)]
    async fn context_records_latest_values() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());

        accessory.start().await;

        let context = accessory.context();
        assert_eq!(context.lock_id, Some(LockId::new(ID)));
        assert_eq!(context.lock_current_state, Some(LockCurrentState::Secured));
        assert_eq!(context.contact_sensor_state, Some(ContactSensorState::Detected));
        assert_eq!(context.model.as_deref(), Some("AUG-SL03"));
        assert_eq!(context.refresh_rate, Some(1800));
    }
}

// ============================================================================
// Command debounce
// ============================================================================

mod commands {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn target_before_start_is_rejected() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());

        let result = accessory.set_lock_target_state(LockTargetState::Unsecured);
        assert!(matches!(result, Err(Error::NotStarted)));
    }

    #[tokio::test(start_paused = true)]
    async fn target_after_shutdown_is_rejected() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;
        accessory.shutdown();

        assert!(!accessory.is_running());
        let result = accessory.set_lock_target_state(LockTargetState::Unsecured);
        assert!(matches!(result, Err(Error::NotStarted)));
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_targets_sends_one_write() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        for _ in 0..5 {
            accessory
                .set_lock_target_state(LockTargetState::Unsecured)
                .unwrap();
        }
        assert_eq!(accessory.state().lock_target(), LockTargetState::Unsecured);
        assert!(accessory.is_update_in_progress());

        sleep(Duration::from_millis(150)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert_eq!(api.lock_calls(), 0);
        assert!(!accessory.is_update_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn latest_target_wins() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(50)).await;
        accessory
            .set_lock_target_state(LockTargetState::Secured)
            .unwrap();
        sleep(Duration::from_millis(50)).await;
        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();

        sleep(Duration::from_millis(150)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert_eq!(api.lock_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_send_separate_writes() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(500)).await;
        accessory
            .set_lock_target_state(LockTargetState::Secured)
            .unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert_eq!(api.lock_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_poll_runs_once() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(api.details_calls(), 1);

        // The lock reports the new position by the time the poll runs.
        api.set_status(ID, Some("kAugLockState_Unlocked"), Some("kAugDoorState_Closed"));
        sleep(Duration::from_secs(5)).await;

        assert_eq!(api.details_calls(), 2);
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Unsecured);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(api.details_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_write_clears_flag_and_still_confirms() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.fail_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(150)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert!(!accessory.is_update_in_progress());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(api.details_calls(), 2);
        // The lock never moved, so the confirmation restores the truth.
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Secured);
        assert_eq!(accessory.state().lock_target(), LockTargetState::Secured);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(api.details_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_skipped_while_update_in_progress() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(
            &api,
            AccessorySettings::default()
                .with_refresh_rate(Duration::from_secs(1))
                .with_push_rate(Duration::from_secs(3)),
        );
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(2500)).await;

        assert!(accessory.is_update_in_progress());
        assert_eq!(api.details_calls(), 1);
        assert_eq!(api.unlock_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn door_push_inside_window_keeps_target() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(
            &api,
            AccessorySettings::default().with_push_rate(Duration::from_secs(1)),
        );
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(100)).await;
        // No lock part, so the accessory refreshes and sees the old bolt.
        api.set_status(ID, Some("kAugLockState_Locked"), Some("kAugDoorState_Open"));
        api.push(ID, door_only(true)).await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(api.details_calls(), 2);
        assert_eq!(accessory.state().contact(), ContactSensorState::NotDetected);
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Secured);
        assert_eq!(accessory.state().lock_target(), LockTargetState::Unsecured);

        sleep(Duration::from_secs(2)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert_eq!(api.lock_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn locked_push_inside_window_keeps_target() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(
            &api,
            AccessorySettings::default().with_push_rate(Duration::from_secs(1)),
        );
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(100)).await;
        api.push(ID, locked_closed()).await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(accessory.state().lock_target(), LockTargetState::Unsecured);

        sleep(Duration::from_secs(2)).await;

        assert_eq!(api.unlock_calls(), 1);
        assert_eq!(api.lock_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn target_during_slow_write_keeps_flag_set() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.delay_writes(Duration::from_millis(500));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(api.unlock_calls(), 1);

        // Lands while the unlock call is still in flight.
        accessory
            .set_lock_target_state(LockTargetState::Secured)
            .unwrap();
        sleep(Duration::from_millis(500)).await;

        assert!(accessory.is_update_in_progress());
        assert_eq!(api.details_calls(), 1);

        sleep(Duration::from_millis(600)).await;

        assert_eq!(api.lock_calls(), 1);
        assert!(!accessory.is_update_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_lock_sends_no_command() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default().with_hidden_lock());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(150)).await;

        assert_eq!(api.unlock_calls(), 0);
        assert_eq!(api.lock_calls(), 0);
        assert!(!accessory.is_update_in_progress());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_confirmation() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        accessory
            .set_lock_target_state(LockTargetState::Unsecured)
            .unwrap();
        sleep(Duration::from_millis(150)).await;
        accessory.shutdown();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(api.details_calls(), 1);
    }
}

// ============================================================================
// Push events
// ============================================================================

mod push {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn pushed_lock_state_applies_without_fetch() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        api.set_status(ID, Some("kAugLockState_Unlocked"), Some("kAugDoorState_Closed"));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;
        assert!(api.has_subscriber(ID));
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Unsecured);

        api.push(ID, locked_closed()).await;
        sleep(Duration::from_millis(10)).await;

        let state = accessory.state();
        assert_eq!(state.lock_current(), LockCurrentState::Secured);
        assert_eq!(state.lock_target(), LockTargetState::Secured);
        assert_eq!(api.details_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transitions_are_logged_once() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        let mut events = accessory.events().subscribe();
        accessory.start().await;
        assert!(transitions(&mut events).is_empty());

        api.push(ID, unlocked_open()).await;
        sleep(Duration::from_millis(10)).await;
        assert_eq!(transitions(&mut events), vec!["Unlocked", "Opened"]);

        api.push(ID, unlocked_open()).await;
        sleep(Duration::from_millis(10)).await;
        assert!(transitions(&mut events).is_empty());

        api.push(ID, locked_closed()).await;
        sleep(Duration::from_millis(10)).await;
        assert_eq!(transitions(&mut events), vec!["Locked", "Closed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_lock_state_falls_back_to_refresh() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default());
        accessory.start().await;

        api.set_status(ID, Some("kAugLockState_Locked"), Some("kAugDoorState_Open"));
        api.push(ID, door_only(true)).await;
        sleep(Duration::from_millis(10)).await;

        assert_eq!(api.details_calls(), 2);
        assert_eq!(accessory.state().contact(), ContactSensorState::NotDetected);
        assert_eq!(accessory.state().lock_current(), LockCurrentState::Secured);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_lock_ignores_pushed_bolt() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(&api, AccessorySettings::default().with_hidden_lock());
        accessory.start().await;

        api.push(ID, unlocked_open()).await;
        sleep(Duration::from_millis(10)).await;

        let state = accessory.state();
        assert_eq!(state.lock_current(), LockCurrentState::Secured);
        assert_eq!(state.contact(), ContactSensorState::NotDetected);
        assert_eq!(api.details_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_contact_sensor_ignores_pushed_door() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let accessory = accessory(
            &api,
            AccessorySettings::default().with_hidden_contact_sensor(),
        );
        accessory.start().await;
        // Never reconciled, so the seeded value stays.
        assert_eq!(accessory.state().contact(), ContactSensorState::NotDetected);

        let state = SimpleState {
            unlocked: true,
            closed: true,
            ..SimpleState::default()
        };
        api.push(ID, state).await;
        sleep(Duration::from_millis(10)).await;

        assert_eq!(accessory.state().lock_current(), LockCurrentState::Unsecured);
        assert_eq!(accessory.state().contact(), ContactSensorState::NotDetected);
        assert_eq!(api.details_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn lock_without_channel_still_polls() {
        let api = Arc::new(MockApi::with_lock(lock_details(ID, "Front Door")));
        let mut details = lock_details(ID, "Front Door");
        details.pubsub_channel = None;
        let accessory = LockAccessory::new(
            Arc::clone(&api),
            &details,
            AccessorySettings::default().with_refresh_rate(Duration::from_secs(1)),
            AccessoryContext::default(),
        );

        accessory.start().await;
        sleep(Duration::from_millis(1500)).await;

        assert!(!api.has_subscriber(ID));
        assert_eq!(api.details_calls(), 2);
    }
}
