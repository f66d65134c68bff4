//! Integration tests for activation filtering, focus notifications and the
//! focus-grab chain.

mod common;

use common::{Event, RecordingDelegate, RecordingView, setup, window_at};
use horizon_pane::{TopLevelConfig, TopLevelWindow};
use horizon_pane_core::{
    ButtonAction, HitTest, Message, MessageResult, Modifiers, MouseButton, Platform, Point, Rect,
};

fn bounds() -> Rect {
    Rect::new(100, 100, 400, 300)
}

fn left_down() -> Message {
    Message::MouseButton {
        button: MouseButton::Left,
        action: ButtonAction::Down,
        point: Point::new(5, 5),
        modifiers: Modifiers::empty(),
    }
}

fn focus_events(delegate: &RecordingDelegate) -> Vec<bool> {
    delegate
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Focus(focused) => Some(focused),
            _ => None,
        })
        .collect()
}

// =========================================================================
// Activation
// =========================================================================

#[test]
fn test_focus_follows_activation() {
    let (platform, ctx) = setup();
    let first_delegate = RecordingDelegate::new();
    let second_delegate = RecordingDelegate::new();
    let first = window_at(&ctx, "first", bounds(), Some(first_delegate.clone()));
    let second = window_at(&ctx, "second", bounds(), Some(second_delegate.clone()));

    first.set_visible(&ctx, true);
    assert!(first.is_focused());
    second.set_visible(&ctx, true);

    assert_eq!(platform.foreground(), second.handle());
    assert!(!first.is_focused());
    assert!(second.is_focused());
    assert_eq!(focus_events(&first_delegate), vec![true, false]);
    assert_eq!(focus_events(&second_delegate), vec![true]);
}

#[test]
fn test_disabled_window_activation_is_vetoed() {
    let (platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let window = window_at(&ctx, "main", bounds(), Some(delegate.clone()));
    assert!(platform.activation_filter_installed());

    window.set_enabled(&ctx, false);
    window.set_visible(&ctx, true);

    assert!(platform.is_visible(window.handle().unwrap()));
    assert_ne!(platform.foreground(), window.handle());
    assert!(delegate.count(&Event::FocusDisabled) >= 1);
    assert!(focus_events(&delegate).is_empty());
}

#[test]
fn test_unfocusable_window_shows_without_activation() {
    let (platform, ctx) = setup();
    let main = window_at(&ctx, "main", bounds(), None);
    main.set_visible(&ctx, true);
    let delegate = RecordingDelegate::new();
    let palette = window_at(&ctx, "palette", bounds(), Some(delegate.clone()));

    palette.set_focusable(&ctx, false);
    palette.set_visible(&ctx, true);

    assert!(platform.is_visible(palette.handle().unwrap()));
    assert_eq!(platform.foreground(), main.handle());
    assert!(!palette.request_focus(&ctx));
    assert_eq!(platform.foreground(), main.handle());
    // Unfocusable is not disabled: nothing to complain about.
    assert_eq!(delegate.count(&Event::FocusDisabled), 0);
}

#[test]
fn test_disabled_window_swallows_mouse() {
    let (_platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let window = window_at(&ctx, "main", bounds(), Some(delegate.clone()));
    let view = RecordingView::new(1);
    window.set_view(&ctx, Some(view.clone()));
    window.set_enabled(&ctx, false);

    let result = ctx.dispatch(
        window.handle().unwrap(),
        Message::MouseMove {
            point: Point::new(10, 10),
            modifiers: Modifiers::empty(),
        },
    );

    assert_eq!(result, MessageResult::ZERO);
    assert!(view.mouse.borrow().is_empty());
    assert_eq!(delegate.count(&Event::FocusDisabled), 1);
}

#[test]
fn test_activation_filter_removed_with_last_window() {
    let (platform, ctx) = setup();
    let first = window_at(&ctx, "first", bounds(), None);
    let second = window_at(&ctx, "second", bounds(), None);
    assert!(platform.activation_filter_installed());

    first.close(&ctx);
    assert!(platform.activation_filter_installed());
    second.close(&ctx);
    assert!(!platform.activation_filter_installed());
}

// =========================================================================
// Grab
// =========================================================================

#[test]
fn test_click_elsewhere_releases_grab() {
    let (_platform, ctx) = setup();
    let holder_delegate = RecordingDelegate::new();
    let holder = window_at(&ctx, "holder", bounds(), Some(holder_delegate.clone()));
    let other = window_at(&ctx, "other", bounds(), None);

    assert!(holder.grab_focus(&ctx));
    ctx.dispatch(other.handle().unwrap(), left_down());

    assert_eq!(ctx.grab_holder(), None);
    assert_eq!(holder_delegate.count(&Event::Ungrab), 1);
}

#[test]
fn test_click_in_owned_window_keeps_grab() {
    let (_platform, ctx) = setup();
    let holder = window_at(&ctx, "holder", bounds(), None);
    let popup = TopLevelWindow::create(
        &ctx,
        TopLevelConfig::new("popup").with_owner(holder.handle().unwrap()),
        None,
    )
    .unwrap();

    holder.grab_focus(&ctx);
    ctx.dispatch(popup.handle().unwrap(), left_down());

    assert_eq!(ctx.grab_holder(), holder.handle());
}

#[test]
fn test_frame_click_releases_own_grab() {
    let (_platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let holder = window_at(&ctx, "holder", bounds(), Some(delegate.clone()));

    holder.grab_focus(&ctx);
    ctx.dispatch(
        holder.handle().unwrap(),
        Message::NcMouseButtonDown {
            button: MouseButton::Left,
            hit: HitTest::Caption,
        },
    );

    assert_eq!(ctx.grab_holder(), None);
    assert_eq!(delegate.count(&Event::Ungrab), 1);
}

#[test]
fn test_deactivation_releases_grab() {
    let (_platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let holder = window_at(&ctx, "holder", bounds(), Some(delegate.clone()));
    let other = window_at(&ctx, "other", bounds(), None);
    holder.set_visible(&ctx, true);
    holder.grab_focus(&ctx);

    other.set_visible(&ctx, true);

    assert_eq!(ctx.grab_holder(), None);
    assert_eq!(delegate.count(&Event::Ungrab), 1);
}

#[test]
fn test_hiding_releases_grab() {
    let (_platform, ctx) = setup();
    let holder = window_at(&ctx, "holder", bounds(), None);
    holder.set_visible(&ctx, true);
    holder.grab_focus(&ctx);

    holder.set_visible(&ctx, false);

    assert_eq!(ctx.grab_holder(), None);
}

#[test]
fn test_released_window_drops_grab() {
    let (_platform, ctx) = setup();
    let holder = window_at(&ctx, "holder", bounds(), None);
    holder.grab_focus(&ctx);

    holder.close(&ctx);

    assert_eq!(ctx.grab_holder(), None);
}
