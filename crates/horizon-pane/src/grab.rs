//! The focus-grab chain and delegate-window redirection.
//!
//! At most one window holds the grab at a time; the slot lives in the
//! [`WindowContext`]. A window grabs through its effective handle (its
//! delegate window if one is set), so the grab follows content that is
//! temporarily hosted elsewhere, e.g. in a full-screen host.
//!
//! Clicking anywhere outside the holder's ancestor chain releases the grab
//! ([`TopLevelWindow::check_ungrab`]); the holder is told through
//! [`WindowDelegate::notify_focus_ungrab`](crate::WindowDelegate::notify_focus_ungrab).

use horizon_pane_core::logging::targets;
use horizon_pane_core::{Rect, SwpFlags, WindowHandle, ZOrder};

use crate::context::WindowContext;
use crate::top_level::TopLevelWindow;

impl WindowContext {
    /// Release the grab unless the holder is `hwnd` or one of its
    /// ancestors. Shared by every window kind that takes button presses.
    pub fn check_ungrab_from(&self, hwnd: WindowHandle) {
        let Some(holder) = self.grab_holder() else {
            return;
        };
        let mut link = Some(hwnd);
        while let Some(current) = link {
            if current == holder {
                return;
            }
            link = self.window(current).and_then(|w| w.base().ancestor());
        }
        tracing::trace!(target: targets::GRAB, holder = holder.as_raw(), "grab released by outside click");
        self.reset_grab();
    }
}

impl TopLevelWindow {
    /// Take the focus grab. Releases the previous holder first. Returns
    /// `true` once this window holds it.
    pub fn grab_focus(&self, ctx: &WindowContext) -> bool {
        let current = self.current_handle();
        if ctx.grab_holder() == Some(current) {
            return true;
        }
        ctx.reset_grab();
        ctx.set_grab_holder(Some(current));
        tracing::debug!(target: targets::GRAB, hwnd = current.as_raw(), "focus grabbed");
        true
    }

    /// Release the grab if this window holds it.
    pub fn ungrab_focus(&self, ctx: &WindowContext) {
        let current = self.current_handle();
        if ctx.grab_holder() != Some(current) {
            return;
        }
        if let Some(delegate) = self.delegate() {
            delegate.notify_focus_ungrab(ctx, current);
        }
        ctx.set_grab_holder(None);
        tracing::debug!(target: targets::GRAB, hwnd = current.as_raw(), "focus ungrabbed");
    }

    /// Release the grab unless the holder is this window or one of its
    /// ancestors.
    pub fn check_ungrab(&self, ctx: &WindowContext) {
        if let Some(hwnd) = self.handle() {
            ctx.check_ungrab_from(hwnd);
        }
    }

    /// Redirect events to `delegate`, or back to this window when `None`.
    ///
    /// Child and owned windows move over to the new effective window, the
    /// grab is dropped and the embedding layer is notified.
    pub fn set_delegate_window(&self, ctx: &WindowContext, delegate: Option<WindowHandle>) {
        let Some(hwnd) = self.handle() else {
            return;
        };
        let from = self.current_handle();
        let to = delegate.unwrap_or(hwnd);
        if from == to {
            return;
        }

        self.ungrab_focus(ctx);
        self.delegate_window.set(delegate);

        let platform = ctx.platform();
        for child in platform.children(from) {
            platform.set_parent(child, Some(to));
            if let Some(window) = ctx.window(child) {
                window.base().set_ancestor(Some(to));
            }
        }
        for owned in platform.owned_windows(from) {
            if owned == to {
                continue;
            }
            platform.set_owner(owned, Some(to));
            if let Some(window) = ctx.window(owned) {
                window.base().set_ancestor(Some(to));
            }
            // Owned windows stay above their new owner.
            platform.set_window_pos(
                ctx,
                owned,
                Some(ZOrder::Top),
                Rect::default(),
                SwpFlags::NO_MOVE | SwpFlags::NO_SIZE | SwpFlags::NO_ACTIVATE,
            );
        }

        tracing::debug!(
            target: targets::GRAB,
            hwnd = hwnd.as_raw(),
            from = from.as_raw(),
            to = to.as_raw(),
            "delegate window changed"
        );
        if let Some(observer) = self.delegate() {
            observer.notify_delegate_window(ctx, hwnd, delegate);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use horizon_pane_core::{HeadlessPlatform, Platform};

    use crate::config::TopLevelConfig;
    use crate::context::WindowContext;
    use crate::top_level::TopLevelWindow;
    use crate::view::WindowDelegate;

    #[derive(Default)]
    struct UngrabCounter {
        ungrabs: Cell<u32>,
    }

    impl WindowDelegate for UngrabCounter {
        fn notify_focus_ungrab(&self, _ctx: &WindowContext, _hwnd: horizon_pane_core::WindowHandle) {
            self.ungrabs.set(self.ungrabs.get() + 1);
        }
    }

    fn setup() -> (Rc<HeadlessPlatform>, WindowContext) {
        let platform = Rc::new(HeadlessPlatform::default());
        let ctx = WindowContext::new(platform.clone()).unwrap();
        (platform, ctx)
    }

    #[test]
    fn test_grab_is_exclusive() {
        let (_platform, ctx) = setup();
        let first_delegate = Rc::new(UngrabCounter::default());
        let first = TopLevelWindow::create(&ctx, TopLevelConfig::new("a"), Some(first_delegate.clone())).unwrap();
        let second = TopLevelWindow::create(&ctx, TopLevelConfig::new("b"), None).unwrap();

        assert!(first.grab_focus(&ctx));
        assert!(first.grab_focus(&ctx));
        assert_eq!(first_delegate.ungrabs.get(), 0);

        assert!(second.grab_focus(&ctx));
        assert_eq!(ctx.grab_holder(), second.handle());
        assert_eq!(first_delegate.ungrabs.get(), 1);
    }

    #[test]
    fn test_check_ungrab_keeps_ancestor_grab() {
        let (_platform, ctx) = setup();
        let owner = TopLevelWindow::create(&ctx, TopLevelConfig::new("owner"), None).unwrap();
        let owned = TopLevelWindow::create(
            &ctx,
            TopLevelConfig::new("owned").with_owner(owner.handle().unwrap()),
            None,
        )
        .unwrap();
        let stranger = TopLevelWindow::create(&ctx, TopLevelConfig::new("stranger"), None).unwrap();

        owner.grab_focus(&ctx);
        owned.check_ungrab(&ctx);
        assert_eq!(ctx.grab_holder(), owner.handle());

        stranger.check_ungrab(&ctx);
        assert_eq!(ctx.grab_holder(), None);
    }

    #[test]
    fn test_delegate_window_moves_owned_windows() {
        let (platform, ctx) = setup();
        let window = TopLevelWindow::create(&ctx, TopLevelConfig::new("main"), None).unwrap();
        let host = TopLevelWindow::create(&ctx, TopLevelConfig::new("host"), None).unwrap();
        let hwnd = window.handle().unwrap();
        let host_hwnd = host.handle().unwrap();
        let palette = TopLevelWindow::create(
            &ctx,
            TopLevelConfig::new("palette").with_owner(hwnd),
            None,
        )
        .unwrap();

        window.grab_focus(&ctx);
        window.set_delegate_window(&ctx, Some(host_hwnd));
        assert_eq!(ctx.grab_holder(), None);
        assert_eq!(window.current_handle(), host_hwnd);
        assert_eq!(platform.owner(palette.handle().unwrap()), Some(host_hwnd));
        assert_eq!(palette.base_window().ancestor(), Some(host_hwnd));

        window.set_delegate_window(&ctx, None);
        assert_eq!(window.current_handle(), hwnd);
        assert_eq!(platform.owner(palette.handle().unwrap()), Some(hwnd));
    }
}
