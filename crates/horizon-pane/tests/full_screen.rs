//! Integration tests for in-place and hosted full-screen presentation.

mod common;

use common::{Event, RecordingDelegate, RecordingView, setup, window_at};
use horizon_pane::{FullScreenWindow, WindowProc};
use horizon_pane_core::{
    ButtonAction, MenuHandle, Message, Modifiers, MouseButton, Platform, Point, Rect, Style, ViewId,
};

const SCREEN: Rect = Rect {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
};

fn bounds() -> Rect {
    Rect::new(100, 100, 800, 600)
}

#[test]
fn test_in_place_round_trip_restores_window() {
    let (platform, ctx) = setup();
    let window = window_at(&ctx, "main", bounds(), None);
    let hwnd = window.handle().unwrap();
    let view = RecordingView::new(7);
    let menu = MenuHandle::from_raw(3);
    window.set_menu(&ctx, Some(menu));
    window.set_view(&ctx, Some(view.clone()));
    window.set_visible(&ctx, true);
    let style = platform.style(hwnd);

    assert!(window.enter_full_screen(&ctx, view.view_id(), false, false));
    assert!(window.is_in_full_screen());
    assert_eq!(platform.window_rect(hwnd).unwrap(), SCREEN);
    assert!(!platform.style(hwnd).contains(Style::CAPTION));
    assert_eq!(platform.menu(hwnd), None);
    assert!(platform.is_topmost(hwnd));
    // The view is told about the new content size.
    assert_eq!(view.sizes.borrow().last(), Some(&(1920, 1080)));

    // Entering twice keeps the first snapshot.
    assert!(window.enter_full_screen(&ctx, view.view_id(), false, false));
    assert_eq!(window.full_screen_snapshot().unwrap().rect, bounds());

    window.exit_full_screen(&ctx, false);
    assert!(!window.is_in_full_screen());
    assert_eq!(platform.window_rect(hwnd).unwrap(), bounds());
    assert_eq!(platform.style(hwnd), style);
    assert_eq!(platform.menu(hwnd), Some(menu));
    assert!(!platform.is_topmost(hwnd));
}

#[test]
fn test_in_place_refuses_foreign_view() {
    let (platform, ctx) = setup();
    let window = window_at(&ctx, "main", bounds(), None);
    let view = RecordingView::new(7);
    window.set_view(&ctx, Some(view.clone()));

    assert!(!window.enter_full_screen(&ctx, ViewId::from_raw(99), false, false));
    assert!(!window.is_in_full_screen());
    assert_eq!(platform.window_rect(window.handle().unwrap()).unwrap(), bounds());
}

#[test]
fn test_hosted_content_receives_input() {
    let (platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let window = window_at(&ctx, "main", bounds(), Some(delegate.clone()));
    let hwnd = window.handle().unwrap();
    let view = RecordingView::new(1);
    window.set_view(&ctx, Some(view.clone()));
    window.set_visible(&ctx, true);

    let host = FullScreenWindow::enter(&ctx, &window, false, false).unwrap();
    let host_hwnd = host.handle().unwrap();
    assert_eq!(host.owner(), hwnd);
    assert_eq!(window.current_handle(), host_hwnd);
    assert!(host.background().is_none());
    assert_eq!(platform.window_rect(host_hwnd).unwrap(), SCREEN);
    assert!(platform.is_topmost(host_hwnd));
    assert_eq!(platform.foreground(), Some(host_hwnd));
    assert!(delegate.events().contains(&Event::DelegateWindow(Some(host_hwnd))));

    ctx.dispatch(host_hwnd, Message::Char { ch: 'x' });
    ctx.dispatch(
        host_hwnd,
        Message::MouseButton {
            button: MouseButton::Left,
            action: ButtonAction::Down,
            point: Point::new(4, 4),
            modifiers: Modifiers::empty(),
        },
    );
    assert_eq!(*view.typed.borrow(), "x");
    assert_eq!(view.mouse.borrow().len(), 1);
}

#[test]
fn test_grab_follows_hosted_content() {
    let (_platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let window = window_at(&ctx, "main", bounds(), Some(delegate.clone()));
    window.set_visible(&ctx, true);
    let host = FullScreenWindow::enter(&ctx, &window, false, false).unwrap();
    let host_hwnd = host.handle().unwrap();

    window.grab_focus(&ctx);
    assert_eq!(ctx.grab_holder(), Some(host_hwnd));

    // A click on the host is a click on the content.
    ctx.dispatch(
        host_hwnd,
        Message::MouseButton {
            button: MouseButton::Left,
            action: ButtonAction::Down,
            point: Point::new(4, 4),
            modifiers: Modifiers::empty(),
        },
    );
    assert_eq!(ctx.grab_holder(), Some(host_hwnd));

    // Closing the host hands the content back and drops the grab.
    ctx.dispatch(host_hwnd, Message::Close);
    assert_eq!(ctx.grab_holder(), None);
    assert_eq!(delegate.count(&Event::Ungrab), 1);
    assert_eq!(window.current_handle(), window.handle().unwrap());
    assert!(delegate.events().contains(&Event::DelegateWindow(None)));
    assert!(ctx.window(host_hwnd).is_none());
}

#[test]
fn test_click_on_hosted_window_releases_host_grab() {
    let (_platform, ctx) = setup();
    let delegate = RecordingDelegate::new();
    let window = window_at(&ctx, "main", bounds(), Some(delegate.clone()));
    let hwnd = window.handle().unwrap();
    window.set_visible(&ctx, true);
    let host = FullScreenWindow::enter(&ctx, &window, false, false).unwrap();
    let host_hwnd = host.handle().unwrap();

    window.grab_focus(&ctx);
    assert_eq!(ctx.grab_holder(), Some(host_hwnd));

    // The hosted window is not in the host's ancestor chain.
    ctx.dispatch(
        hwnd,
        Message::MouseButton {
            button: MouseButton::Left,
            action: ButtonAction::Down,
            point: Point::new(4, 4),
            modifiers: Modifiers::empty(),
        },
    );
    assert_eq!(ctx.grab_holder(), None);
    assert_eq!(delegate.count(&Event::Ungrab), 1);

    window.grab_focus(&ctx);
    window.check_ungrab(&ctx);
    assert_eq!(ctx.grab_holder(), None);
}

#[test]
fn test_hosted_twice_is_refused() {
    let (_platform, ctx) = setup();
    let window = window_at(&ctx, "main", bounds(), None);
    let _host = FullScreenWindow::enter(&ctx, &window, false, false).unwrap();

    assert!(FullScreenWindow::enter(&ctx, &window, false, false).is_none());
}

#[test]
fn test_letterboxed_host_fades_background() {
    let (platform, ctx) = setup();
    let window = window_at(&ctx, "main", bounds(), None);
    window.set_visible(&ctx, true);

    let host = FullScreenWindow::enter(&ctx, &window, true, true).unwrap();
    let host_rect = platform.window_rect(host.handle().unwrap()).unwrap();
    assert_eq!(host_rect.height, SCREEN.height);
    assert!(host_rect.width < SCREEN.width);

    let background = host.background().unwrap();
    let background_hwnd = background.base().handle().unwrap();
    assert_eq!(platform.window_rect(background_hwnd).unwrap(), SCREEN);
    assert_eq!(background.alpha(), 0);
    for _ in 0..16 {
        platform.fire_timers(&ctx);
    }
    assert_eq!(background.alpha(), 255);
    assert!(!background.is_fading());

    host.exit(&ctx, true);
    assert!(platform.is_window(background_hwnd));
    for _ in 0..16 {
        platform.fire_timers(&ctx);
    }
    assert!(!platform.is_window(background_hwnd));
    assert!(ctx.window(background_hwnd).is_none());
}
