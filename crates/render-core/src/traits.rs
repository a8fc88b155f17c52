use crate::error::RenderError;
use inscribe_placement::PageLayout;
use inscribe_roster::NameEntry;

/// Personalizes one template page for one recipient.
///
/// Implementations must be pure: the same inputs always give byte-identical
/// output, and concurrent calls share no mutable state. A disabled layout
/// returns `template_page` unchanged.
pub trait PageRenderer: Send + Sync {
    fn render(
        &self,
        template_page: &[u8],
        layout: &PageLayout,
        name: &NameEntry,
    ) -> Result<Vec<u8>, RenderError>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
