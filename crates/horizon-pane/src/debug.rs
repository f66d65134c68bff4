//! Debug views of the live window hierarchy.
//!
//! ```ignore
//! use horizon_pane::WindowTreeDebug;
//!
//! tracing::debug!("{}", WindowTreeDebug::new().format_all(&ctx));
//! ```
//!
//! Output looks like:
//!
//! ```text
//! Window Tree (4 windows):
//! Application [h1]
//! Main [h2] TopLevel (100, 100, 800, 600)
//! ├── Palette [h4] TopLevel (140, 140, 300, 200)
//! └── (untitled) [h3] FullScreen (0, 0, 1920, 1080) hidden
//! ```

use std::fmt::{self, Write as FmtWrite};

use horizon_pane_core::WindowHandle;

use crate::context::WindowContext;

/// Options for [`WindowTreeDebug`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeFormatOptions {
    /// Show raw handles.
    pub show_handles: bool,
    /// Show window kinds.
    pub show_kinds: bool,
    /// Show frame rectangles.
    pub show_rects: bool,
    /// Maximum depth, `None` for unlimited.
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            show_handles: true,
            show_kinds: true,
            show_rects: true,
            max_depth: None,
        }
    }
}

/// Renders registered windows as a tree following ancestor links.
#[derive(Debug, Clone, Default)]
pub struct WindowTreeDebug {
    options: TreeFormatOptions,
}

impl WindowTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every registered window. Windows whose ancestor is not
    /// registered are roots.
    pub fn format_all(&self, ctx: &WindowContext) -> String {
        let handles = ctx.handles();
        let mut output = String::new();
        let _ = writeln!(output, "Window Tree ({} windows):", handles.len());
        for hwnd in roots(ctx, &handles) {
            let _ = self.format_subtree_into(ctx, &handles, hwnd, 0, &mut output, "");
        }
        output
    }

    /// Format the subtree rooted at `root`.
    pub fn format_subtree(&self, ctx: &WindowContext, root: WindowHandle) -> String {
        let handles = ctx.handles();
        let mut output = String::new();
        let _ = self.format_subtree_into(ctx, &handles, root, 0, &mut output, "");
        output
    }

    fn format_subtree_into(
        &self,
        ctx: &WindowContext,
        handles: &[WindowHandle],
        hwnd: WindowHandle,
        depth: usize,
        output: &mut String,
        indent: &str,
    ) -> fmt::Result {
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return Ok(());
        }
        let Some(window) = ctx.window(hwnd) else {
            return Ok(());
        };
        let platform = ctx.platform();

        let name = platform.window_text(hwnd);
        output.push_str(if name.is_empty() { "(untitled)" } else { &name });
        if self.options.show_handles {
            write!(output, " [h{}]", hwnd.as_raw() & 0xffff_ffff)?;
        }
        if self.options.show_kinds {
            write!(output, " {:?}", window.kind())?;
        }
        if self.options.show_rects {
            if let Ok(rect) = platform.window_rect(hwnd) {
                write!(output, " ({}, {}, {}, {})", rect.x, rect.y, rect.width, rect.height)?;
            }
        }
        if !platform.is_visible(hwnd) {
            output.push_str(" hidden");
        }
        if window.base().is_dead() {
            output.push_str(" dead");
        }
        output.push('\n');

        let children: Vec<WindowHandle> = handles
            .iter()
            .copied()
            .filter(|&h| h != hwnd && ctx.window(h).and_then(|w| w.base().ancestor()) == Some(hwnd))
            .collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let last = i + 1 == count;
            output.push_str(indent);
            output.push_str(if last { "\u{2514}\u{2500}\u{2500} " } else { "\u{251c}\u{2500}\u{2500} " });
            let nested = format!("{indent}{}", if last { "    " } else { "\u{2502}   " });
            self.format_subtree_into(ctx, handles, child, depth + 1, output, &nested)?;
        }
        Ok(())
    }
}

fn roots(ctx: &WindowContext, handles: &[WindowHandle]) -> Vec<WindowHandle> {
    handles
        .iter()
        .copied()
        .filter(|&h| {
            ctx.window(h)
                .and_then(|w| w.base().ancestor())
                .is_none_or(|ancestor| !handles.contains(&ancestor))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use horizon_pane_core::HeadlessPlatform;

    use super::*;
    use crate::config::TopLevelConfig;
    use crate::top_level::TopLevelWindow;

    #[test]
    fn test_owned_window_nested_under_owner() {
        let ctx = WindowContext::new(Rc::new(HeadlessPlatform::default())).unwrap();
        let main = TopLevelWindow::create(&ctx, TopLevelConfig::new("Main"), None).unwrap();
        let _palette = TopLevelWindow::create(
            &ctx,
            TopLevelConfig::new("Palette").with_owner(main.handle().unwrap()),
            None,
        )
        .unwrap();

        let text = WindowTreeDebug::new().format_all(&ctx);
        assert!(text.starts_with("Window Tree (3 windows):"));
        let main_line = text.lines().position(|l| l.starts_with("Main")).unwrap();
        assert!(text.lines().nth(main_line + 1).unwrap().contains("Palette"));
        assert!(text.contains("TopLevel"));
    }

    #[test]
    fn test_max_depth_limits_output() {
        let ctx = WindowContext::new(Rc::new(HeadlessPlatform::default())).unwrap();
        let main = TopLevelWindow::create(&ctx, TopLevelConfig::new("Main"), None).unwrap();
        let _palette = TopLevelWindow::create(
            &ctx,
            TopLevelConfig::new("Palette").with_owner(main.handle().unwrap()),
            None,
        )
        .unwrap();

        let debug = WindowTreeDebug::with_options(TreeFormatOptions {
            max_depth: Some(0),
            ..Default::default()
        });
        let text = debug.format_subtree(&ctx, main.handle().unwrap());
        assert!(text.contains("Main"));
        assert!(!text.contains("Palette"));
    }
}
