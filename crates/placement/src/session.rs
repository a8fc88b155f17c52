use crate::font::{Alignment, FontFamily};
use crate::layout::PageLayout;
use crate::position::normalize_position;
use crate::set::LayoutSet;
use crate::{MAX_FONT_SIZE, MAX_LINE_SPACING, MIN_FONT_SIZE, MIN_LINE_SPACING};
use inscribe_types::Color;
use log::debug;

/// Interactive editing state for a layout set: the page being edited and
/// whether the name is currently being dragged.
///
/// Every edit returns `true` when it changed something. Edits that the
/// editor would not allow (dragging a locked page, styling a disabled one)
/// are silent no-ops rather than errors.
#[derive(Debug, Clone)]
pub struct EditingSession {
    layouts: Vec<PageLayout>,
    current: usize,
    dragging: bool,
}

impl EditingSession {
    pub fn new(set: LayoutSet) -> Self {
        Self {
            layouts: set.into_vec(),
            current: 0,
            dragging: false,
        }
    }

    pub fn layouts(&self) -> &[PageLayout] {
        &self.layouts
    }

    pub fn current(&self) -> Option<&PageLayout> {
        self.layouts.get(self.current)
    }

    pub fn current_page(&self) -> Option<u32> {
        self.current().map(|layout| layout.page_number)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn select_page(&mut self, page_number: u32) -> bool {
        let Some(index) = self
            .layouts
            .iter()
            .position(|layout| layout.page_number == page_number)
        else {
            return false;
        };
        self.dragging = false;
        self.current = index;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if self.current + 1 >= self.layouts.len() {
            return false;
        }
        self.dragging = false;
        self.current += 1;
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.dragging = false;
        self.current -= 1;
        true
    }

    pub fn begin_drag(&mut self) -> bool {
        match self.current() {
            Some(layout) if layout.enabled && !layout.locked => {
                self.dragging = true;
                true
            }
            _ => false,
        }
    }

    /// Moves the anchor to the pointer, given in pixels relative to the
    /// preview container.
    pub fn drag_to(&mut self, x_pixels: f32, y_pixels: f32, width: f32, height: f32) -> bool {
        if !self.dragging {
            return false;
        }
        let Some(layout) = self.layouts.get_mut(self.current) else {
            return false;
        };
        if layout.locked || !layout.enabled {
            return false;
        }
        layout.position = normalize_position(x_pixels, y_pixels, width, height);
        true
    }

    pub fn end_drag(&mut self) {
        if self.dragging {
            debug!("Drag ended on page {:?}", self.current_page());
        }
        self.dragging = false;
    }

    pub fn set_font_size(&mut self, size: f32) -> bool {
        if size.is_nan() {
            return false;
        }
        self.edit_enabled(|layout| layout.font_size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
    }

    pub fn set_line_spacing(&mut self, spacing: f32) -> bool {
        if spacing.is_nan() {
            return false;
        }
        self.edit_enabled(|layout| {
            layout.line_spacing = spacing.clamp(MIN_LINE_SPACING, MAX_LINE_SPACING)
        })
    }

    pub fn set_font_family(&mut self, family: FontFamily) -> bool {
        self.edit_enabled(|layout| layout.font_family = family)
    }

    pub fn set_font_color(&mut self, color: Color) -> bool {
        self.edit_enabled(|layout| layout.font_color = color)
    }

    pub fn set_alignment(&mut self, alignment: Alignment) -> bool {
        self.edit_enabled(|layout| layout.alignment = alignment)
    }

    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let Some(layout) = self.layouts.get_mut(self.current) else {
            return false;
        };
        layout.enabled = enabled;
        if !enabled {
            self.dragging = false;
        }
        true
    }

    pub fn toggle_lock(&mut self) -> bool {
        let changed = self.edit_enabled(|layout| layout.locked = !layout.locked);
        if self.current().is_some_and(|layout| layout.locked) {
            self.dragging = false;
        }
        changed
    }

    /// Ends the session and hands back the edited layouts.
    pub fn finish(self) -> LayoutSet {
        // Edits are clamped and never touch page numbers.
        LayoutSet::from_checked(self.layouts)
    }

    fn edit_enabled(&mut self, edit: impl FnOnce(&mut PageLayout)) -> bool {
        match self.layouts.get_mut(self.current) {
            Some(layout) if layout.enabled => {
                edit(layout);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn session(pages: u32) -> EditingSession {
        EditingSession::new(LayoutSet::defaults(pages))
    }

    #[test]
    fn drag_moves_the_current_page_only() {
        let mut s = session(2);
        assert!(s.begin_drag());
        assert!(s.drag_to(100.0, 300.0, 400.0, 600.0));
        s.end_drag();
        assert_eq!(s.current().unwrap().position, Position::new(25.0, 50.0));
        assert_eq!(s.layouts()[1].position, Position::CENTER);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut s = session(1);
        assert!(!s.drag_to(10.0, 10.0, 100.0, 100.0));
        assert_eq!(s.current().unwrap().position, Position::CENTER);
    }

    #[test]
    fn locked_page_cannot_be_dragged() {
        let mut s = session(1);
        assert!(s.toggle_lock());
        assert!(!s.begin_drag());
        assert!(!s.drag_to(0.0, 0.0, 100.0, 100.0));
        assert_eq!(s.current().unwrap().position, Position::CENTER);
    }

    #[test]
    fn locking_mid_drag_stops_the_drag() {
        let mut s = session(1);
        assert!(s.begin_drag());
        s.toggle_lock();
        assert!(!s.is_dragging());
        assert!(!s.drag_to(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn disabled_page_ignores_style_edits() {
        let mut s = session(1);
        assert!(s.set_enabled(false));
        assert!(!s.set_font_size(40.0));
        assert!(!s.set_alignment(Alignment::Right));
        assert!(!s.toggle_lock());
        assert!(!s.begin_drag());
        assert_eq!(s.current().unwrap().font_size, 24.0);
    }

    #[test]
    fn sliders_clamp_to_editor_ranges() {
        let mut s = session(1);
        s.set_font_size(200.0);
        s.set_line_spacing(0.1);
        let layout = s.current().unwrap();
        assert_eq!(layout.font_size, 72.0);
        assert_eq!(layout.line_spacing, 0.8);
    }

    #[test]
    fn page_navigation_stays_in_bounds() {
        let mut s = session(3);
        assert!(!s.previous_page());
        assert!(s.next_page());
        assert!(s.next_page());
        assert!(!s.next_page());
        assert_eq!(s.current_page(), Some(3));
        assert!(s.select_page(1));
        assert!(!s.select_page(9));
        assert_eq!(s.current_page(), Some(1));
    }

    #[test]
    fn finish_returns_edited_set() {
        let mut s = session(2);
        s.next_page();
        s.set_font_family(FontFamily::Verdana);
        s.set_font_color(Color::rgb(200, 0, 0));
        let set = s.finish();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(2).unwrap().font_family, FontFamily::Verdana);
        assert_eq!(set.get(1).unwrap().font_family, FontFamily::NotoSansGujarati);
    }

    #[test]
    fn empty_session_is_inert() {
        let mut s = session(0);
        assert!(s.current().is_none());
        assert!(!s.begin_drag());
        assert!(!s.set_enabled(false));
        assert!(s.finish().is_empty());
    }
}
